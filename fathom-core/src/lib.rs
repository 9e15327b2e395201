pub mod error;
pub mod fractal;
pub mod mandelbrot;
pub mod viewport;

// Re-export primary types for convenience.
pub use error::CoreError;
pub use fractal::Fractal;
pub use mandelbrot::{iteration_limit, Mandelbrot};
pub use viewport::{GridSize, Viewport};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
