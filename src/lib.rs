//! # maligan
//!
//! Adversarial training for discrete sequence generators.
//!
//! A generator emits token sequences one sample at a time; a discriminator
//! judges them against real text. Because sampling a token is not
//! differentiable, the generator is updated with a policy-gradient loss whose
//! per-sequence weights are Monte Carlo estimates of the discriminator's
//! opinion, normalized into zero-mean advantages.
//!
//! ## Layout
//!
//! - [`autograd`]: tape-based reverse-mode differentiation over flat tensors
//! - [`optim`]: optimizers and gradient clipping
//! - [`train`]: loss accumulation and single-step parameter updates
//! - [`gan`]: sampler, scorer, reward estimator and the phase scheduler
//! - [`data`]: corpus, integer encoder and windowed language-modeling batches
//! - [`config`]: YAML training specifications and CLI arguments
//!
//! ## Example
//!
//! ```no_run
//! use maligan::data::{Corpus, CorpusType, IntegerEncoder, LanguageModelingDataset};
//! use maligan::gan::{MaliGanConfig, TrainingConfig, TrainingScheduler};
//!
//! let corpus = Corpus::from_text("the quick brown fox", CorpusType::Char);
//! let encoder = IntegerEncoder::learn(&corpus);
//! let tokens = encoder.encode(corpus.tokens())?;
//! let mut batches = LanguageModelingDataset::new(&tokens, corpus.vocab_size(), 4, 2, false, 0)?;
//!
//! let model = MaliGanConfig { vocab_size: corpus.vocab_size(), ..MaliGanConfig::default() };
//! let mut scheduler = TrainingScheduler::new(model, TrainingConfig::default())?;
//! scheduler.run(&mut batches)?;
//! # Ok::<(), maligan::Error>(())
//! ```

pub mod autograd;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod gan;
pub mod optim;
pub mod train;

pub use autograd::Tensor;
pub use error::{Error, Result};
