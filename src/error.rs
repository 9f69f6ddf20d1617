//! Crate-wide error type
//!
//! Errors fall into four groups:
//! - configuration errors, raised eagerly when a model or trainer is built
//! - shape errors, raised when batches disagree and never retried
//! - phase-ordering errors from the training state machine
//! - step errors, which wrap any of the above with the phase, epoch and batch
//!   index of the update that failed

use crate::gan::TrainingPhase;
use thiserror::Error;

/// Result type for maligan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or training an adversarial model
#[derive(Debug, Error)]
pub enum Error {
    /// Sampling temperature must be a finite value strictly greater than zero
    #[error("Invalid temperature: {0} (must be finite and > 0)")]
    InvalidTemperature(f32),

    /// Vocabulary must hold at least one token
    #[error("Invalid vocabulary size: {0} (must be >= 1)")]
    InvalidVocabSize(usize),

    /// Corpus tokenizer type is not recognised
    #[error("Unsupported corpus type: {0} (must be `char` or `word`)")]
    UnsupportedCorpusType(String),

    /// A configuration value is out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Two batches or tensors disagree in shape
    #[error("Shape mismatch in {context}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A token index lies outside `[0, vocab_size)`
    #[error("Token {token} out of range for vocabulary of size {vocab_size}")]
    TokenOutOfRange { token: u32, vocab_size: usize },

    /// Encoder was asked to encode a token it has never seen
    #[error("Unknown token: {0:?}")]
    UnknownToken(String),

    /// Training phases were entered out of order
    #[error("Invalid phase transition: {from} -> {to}")]
    InvalidTransition { from: TrainingPhase, to: TrainingPhase },

    /// Loss evaluated to NaN or infinity; the update is refused
    #[error("Non-finite loss: {0}")]
    NonFiniteLoss(f32),

    /// A parameter bundle does not match the network it is loaded into
    #[error("Parameter bundle mismatch: {0}")]
    BundleMismatch(String),

    /// A training step failed; carries where it happened
    #[error("{phase} epoch {epoch} batch {batch}: {source}")]
    Step {
        phase: TrainingPhase,
        epoch: usize,
        batch: usize,
        #[source]
        source: Box<Error>,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Attach the phase/epoch/batch position to an error raised inside a step
    pub fn at_step(self, phase: TrainingPhase, epoch: usize, batch: usize) -> Self {
        match self {
            // Already positioned by an inner step; keep the innermost location
            err @ Error::Step { .. } => err,
            other => Error::Step {
                phase,
                epoch,
                batch,
                source: Box::new(other),
            },
        }
    }

    /// True for errors that indicate a bad configuration rather than a runtime failure
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidTemperature(_)
                | Error::InvalidVocabSize(_)
                | Error::UnsupportedCorpusType(_)
                | Error::InvalidConfig(_)
                | Error::ConfigError(_)
        )
    }
}
