use thiserror::Error;

/// Errors originating from the core evaluation engine.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid resolution: {0}% (must be within 1..=100)")]
    InvalidResolution(u8),

    #[error("invalid zoom factor: {0} (must be >= 2)")]
    InvalidZoomFactor(u32),

    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },
}
