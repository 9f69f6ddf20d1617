//! Maximum-likelihood augmented GAN for discrete sequences
//!
//! A recurrent generator samples token sequences; a convolutional
//! discriminator separates them from real text. The generator never sees the
//! discriminator's gradients. Instead each sampled sequence is scored, the
//! scores become zero-mean rewards, and the generator's next-token loss on its
//! own samples is weighted by them.
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────── real (x, y) ──────────────┐
//!              │                                       ▼
//! start token ─┴─► Generator ─► x_fake ─┬─► Discriminator ─► real / fake
//!      ▲              ▲                 │        │
//!      │              │                 │        ▼
//!   uniform           └── weighted NLL ◄┴── RewardEstimator
//! ```
//!
//! [`TrainingScheduler`] sequences the updates:
//! generator pretraining, discriminator pretraining, then adversarial epochs.

mod batch;
mod config;
mod discriminator;
mod generator;
mod init;
mod params;
mod reward;
mod scheduler;
mod source;

pub use batch::SequenceBatch;
pub use config::{validate_temperature, MaliGanConfig, OptimizerKind, TrainingConfig};
pub use discriminator::{Discriminator, SequenceScorer, FAKE_CLASS, REAL_CLASS};
pub use generator::{Generator, RecurrentMemory};
pub use params::{ModelBundle, ParameterBundle, Parametrized};
pub use reward::{normalize, Reward, RewardEstimator};
pub use scheduler::{
    EpochReport, EventLog, LossSummary, Network, TrainingCallback, TrainingPhase,
    TrainingScheduler, UpdateEvent,
};
pub use source::{BatchPair, BatchSource};
