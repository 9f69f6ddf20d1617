//! Declarative YAML configuration and CLI arguments
//!
//! A training run is described by a [`TrainSpec`]:
//!
//! - `data`: corpus path, `char`/`word` tokenization, sequence length, batch size
//! - `model`: generator and discriminator sizes ([`ModelSpec`])
//! - `training`: phase epoch counts, rollouts, optimizer ([`crate::gan::TrainingConfig`])
//! - `output`: optional path for the trained parameter bundle

mod cli;
mod schema;
mod train;
mod validate;

pub use cli::{
    apply_overrides, parse_args, Cli, Command, SampleArgs, TrainArgs, ValidateArgs,
};
pub use schema::{DataSpec, ModelSpec, TrainSpec};
pub use train::{
    build_pipeline, load_config, train_from_spec, train_from_yaml, Pipeline, TrainOutcome,
};
pub use validate::{validate_config, ValidationError};
