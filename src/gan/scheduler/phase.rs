//! Training phases, in the only order they may run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the adversarial schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrainingPhase {
    /// Supervised next-token training of the generator
    PretrainGenerator,
    /// Real-vs-fake classification against the pretrained generator
    PretrainDiscriminator,
    /// Reward-weighted generator updates interleaved with discriminator updates
    Adversarial,
    /// Terminal
    Done,
}

impl TrainingPhase {
    /// The phase that follows this one; `Done` is absorbing
    pub fn next(self) -> Self {
        match self {
            TrainingPhase::PretrainGenerator => TrainingPhase::PretrainDiscriminator,
            TrainingPhase::PretrainDiscriminator => TrainingPhase::Adversarial,
            TrainingPhase::Adversarial | TrainingPhase::Done => TrainingPhase::Done,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrainingPhase::PretrainGenerator => "PRETRAIN_GENERATOR",
            TrainingPhase::PretrainDiscriminator => "PRETRAIN_DISCRIMINATOR",
            TrainingPhase::Adversarial => "ADVERSARIAL",
            TrainingPhase::Done => "DONE",
        }
    }
}

impl fmt::Display for TrainingPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
