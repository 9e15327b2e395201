pub mod error;
pub mod export;
pub mod field;
pub mod frontier;
pub mod session;

// Re-export primary types for convenience.
pub use error::EngineError;
pub use export::export_png;
pub use field::FieldBuffer;
pub use frontier::Frontier;
pub use session::{Frame, Session, SessionOptions};

/// Convenience result type for the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;
