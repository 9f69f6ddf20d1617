//! Per-epoch loss reports.

use super::TrainingPhase;
use serde::{Deserialize, Serialize};

/// Which network an update touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Generator,
    Discriminator,
}

/// One applied optimizer step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateEvent {
    pub phase: TrainingPhase,
    pub network: Network,
    /// Epoch within the phase (0-indexed)
    pub epoch: usize,
    /// Index of the real batch being processed
    pub batch: usize,
    pub loss: f32,
}

/// Epoch-mean losses of one epoch of one phase
///
/// A loss is `None` when its network is not updated in that phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochReport {
    pub phase: TrainingPhase,
    pub epoch: usize,
    pub generator_loss: Option<f32>,
    pub discriminator_loss: Option<f32>,
    /// Real batches consumed
    pub batches: usize,
}

/// Most recent epoch-mean loss of each of the four loss streams
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LossSummary {
    pub pretrain_generator: Option<f32>,
    pub pretrain_discriminator: Option<f32>,
    pub adversarial_generator: Option<f32>,
    pub adversarial_discriminator: Option<f32>,
}

impl LossSummary {
    /// Build from a report history, keeping the latest value per stream
    pub fn from_history(history: &[EpochReport]) -> Self {
        let mut summary = Self::default();
        for report in history {
            match report.phase {
                TrainingPhase::PretrainGenerator => {
                    summary.pretrain_generator = report.generator_loss;
                }
                TrainingPhase::PretrainDiscriminator => {
                    summary.pretrain_discriminator = report.discriminator_loss;
                }
                TrainingPhase::Adversarial => {
                    summary.adversarial_generator = report.generator_loss;
                    summary.adversarial_discriminator = report.discriminator_loss;
                }
                TrainingPhase::Done => {}
            }
        }
        summary
    }

    /// All four streams, `None` for those not yet reported
    pub fn as_array(&self) -> [Option<f32>; 4] {
        [
            self.pretrain_generator,
            self.pretrain_discriminator,
            self.adversarial_generator,
            self.adversarial_discriminator,
        ]
    }
}
