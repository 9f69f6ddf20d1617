//! Model and training hyperparameters

use crate::error::{Error, Result};
use crate::optim::{Adam, Optimizer, SGD};
use serde::{Deserialize, Serialize};

/// Architecture of the generator/discriminator pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaliGanConfig {
    /// Number of distinct tokens
    pub vocab_size: usize,

    /// Width of both networks' token embeddings
    pub embedding_size: usize,

    /// LSTM hidden width of the generator
    pub hidden_size: usize,

    /// Sequence length the discriminator is built for
    pub max_length: usize,

    /// Default sampling temperature
    pub temperature: f32,

    /// Output channels per discriminator convolution
    pub n_filters: Vec<usize>,

    /// Kernel width (in tokens) per discriminator convolution
    pub filters_size: Vec<usize>,

    /// Discriminator dropout applied before the output layer during training
    pub dropout_rate: f32,
}

impl Default for MaliGanConfig {
    fn default() -> Self {
        Self {
            vocab_size: 1,
            embedding_size: 32,
            hidden_size: 64,
            max_length: 8,
            temperature: 1.0,
            n_filters: vec![64],
            filters_size: vec![1],
            dropout_rate: 0.25,
        }
    }
}

impl MaliGanConfig {
    /// Reject any setting the networks cannot be built with
    pub fn validate(&self) -> Result<()> {
        if self.vocab_size == 0 {
            return Err(Error::InvalidVocabSize(self.vocab_size));
        }
        validate_temperature(self.temperature)?;

        if self.embedding_size == 0 || self.hidden_size == 0 || self.max_length == 0 {
            return Err(Error::InvalidConfig(format!(
                "embedding_size ({}), hidden_size ({}) and max_length ({}) must be > 0",
                self.embedding_size, self.hidden_size, self.max_length
            )));
        }
        if self.n_filters.is_empty() || self.n_filters.len() != self.filters_size.len() {
            return Err(Error::InvalidConfig(format!(
                "n_filters ({}) and filters_size ({}) must be non-empty and of equal length",
                self.n_filters.len(),
                self.filters_size.len()
            )));
        }
        if self.n_filters.contains(&0) {
            return Err(Error::InvalidConfig("n_filters entries must be > 0".into()));
        }
        if let Some(&k) = self.filters_size.iter().find(|&&k| k == 0 || k > self.max_length) {
            return Err(Error::InvalidConfig(format!(
                "filter size {k} must be in [1, max_length = {}]",
                self.max_length
            )));
        }
        if !(0.0..1.0).contains(&self.dropout_rate) {
            return Err(Error::InvalidConfig(format!(
                "dropout_rate {} must be in [0, 1)",
                self.dropout_rate
            )));
        }
        Ok(())
    }
}

/// Temperatures must be finite and strictly positive
pub fn validate_temperature(temperature: f32) -> Result<()> {
    if temperature.is_finite() && temperature > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTemperature(temperature))
    }
}

/// Optimizer used for both networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerKind {
    #[default]
    Adam,
    Sgd,
}

impl OptimizerKind {
    pub fn build(self, lr: f32) -> Box<dyn Optimizer> {
        match self {
            OptimizerKind::Adam => Box::new(Adam::default_params(lr)),
            OptimizerKind::Sgd => Box::new(SGD::new(lr, 0.0)),
        }
    }
}

/// Epoch counts and optimizer settings for the phase schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Generator pretraining epochs
    pub g_epochs: usize,

    /// Discriminator pretraining epochs, and discriminator epochs per
    /// adversarial batch
    pub d_epochs: usize,

    /// Discriminator updates per discriminator epoch
    pub d_steps: usize,

    /// Scorer evaluations averaged into each reward
    pub n_rollouts: usize,

    /// Adversarial epochs
    pub epochs: usize,

    pub g_learning_rate: f32,

    pub d_learning_rate: f32,

    pub optimizer: OptimizerKind,

    /// Global gradient-norm clip applied before every update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_grad_norm: Option<f32>,

    /// Seed for sampling, subsets and dropout; entropy from the OS when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            g_epochs: 1,
            d_epochs: 1,
            d_steps: 1,
            n_rollouts: 4,
            epochs: 1,
            g_learning_rate: 0.001,
            d_learning_rate: 0.001,
            optimizer: OptimizerKind::default(),
            max_grad_norm: Some(5.0),
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn validate(&self) -> Result<()> {
        let counts = [
            ("g_epochs", self.g_epochs),
            ("d_epochs", self.d_epochs),
            ("d_steps", self.d_steps),
            ("n_rollouts", self.n_rollouts),
            ("epochs", self.epochs),
        ];
        if let Some((name, value)) = counts.iter().find(|(_, v)| *v == 0) {
            return Err(Error::InvalidConfig(format!("{name} must be >= 1, got {value}")));
        }
        let rates = [
            ("g_learning_rate", self.g_learning_rate),
            ("d_learning_rate", self.d_learning_rate),
        ];
        for (name, lr) in rates {
            if !(lr.is_finite() && lr > 0.0) {
                return Err(Error::InvalidConfig(format!("{name} must be > 0, got {lr}")));
            }
        }
        if let Some(norm) = self.max_grad_norm {
            if !(norm.is_finite() && norm > 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "max_grad_norm must be > 0, got {norm}"
                )));
            }
        }
        Ok(())
    }
}
