use thiserror::Error;

/// Errors originating from the scheduling and export pipeline.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to write image file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode png: {0}")]
    Encode(#[from] png::EncodingError),

    #[error(transparent)]
    Core(#[from] fathom_core::CoreError),
}
