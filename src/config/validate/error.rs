//! Validation error types

use crate::error::Error;

/// Validation error type
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Training data path does not exist: {0}")]
    DataNotFound(String),

    #[error("Unsupported corpus type: {0} (must be `char` or `word`)")]
    UnsupportedCorpusType(String),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid max_length: {0} (must be > 0)")]
    InvalidMaxLength(usize),

    #[error("Invalid {name}: {value} (must be > 0)")]
    InvalidDimension { name: &'static str, value: usize },

    #[error("Invalid temperature: {0} (must be finite and > 0)")]
    InvalidTemperature(f32),

    #[error("Invalid dropout rate: {0} (must be in [0.0, 1.0))")]
    InvalidDropout(f32),

    #[error("Invalid filters: {0}")]
    InvalidFilters(String),

    #[error("Invalid {name}: {value} (must be >= 1)")]
    InvalidCount { name: &'static str, value: usize },

    #[error("Invalid {name}: {value} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate { name: &'static str, value: f32 },

    #[error("Invalid gradient clip value: {0} (must be > 0.0)")]
    InvalidGradClip(f32),
}

/// Keeps the crate-wide kinds callers match on; everything else is an
/// out-of-range setting
impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedCorpusType(kind) => Error::UnsupportedCorpusType(kind),
            ValidationError::InvalidTemperature(t) => Error::InvalidTemperature(t),
            missing @ ValidationError::DataNotFound(_) => Error::ConfigError(missing.to_string()),
            other => Error::InvalidConfig(other.to_string()),
        }
    }
}
