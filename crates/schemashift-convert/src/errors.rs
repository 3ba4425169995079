use thiserror::Error;

use schemashift_core::Error as CoreError;

/// Errors emitted by the conversion engine.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
