//! CLI argument parsing
//!
//! ```bash
//! maligan train config.yaml
//! maligan train config.yaml --epochs 5 --seed 42
//! maligan validate config.yaml
//! maligan sample config.yaml --length 40 --temperature 0.8
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::schema::TrainSpec;

/// MaliGAN: adversarial training for discrete sequence generators
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "maligan")]
#[command(version)]
#[command(about = "Train text generators with likelihood-weighted adversarial rewards")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Pretrain and adversarially train from a YAML configuration
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// Sample text from the configured generator
    Sample(SampleArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Training config (YAML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override the number of adversarial epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Replace `training.seed`
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override where the parameter bundle is written
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Load and check the config, print the schedule, then stop
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Training config (YAML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Print every resolved setting
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the sample command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct SampleArgs {
    /// Training config (YAML)
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Tokens to generate
    #[arg(short, long, default_value_t = 32)]
    pub length: usize,

    /// Sampling temperature; the configured one when absent
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Number of independent samples
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Sampling seed (defaults to the config seed)
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Parse arguments from an iterator (for testing)
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a loaded spec
pub fn apply_overrides(spec: &mut TrainSpec, args: &TrainArgs) {
    if let Some(epochs) = args.epochs {
        spec.training.epochs = epochs;
    }
    if let Some(seed) = args.seed {
        spec.training.seed = Some(seed);
    }
    if let Some(output) = &args.output {
        spec.output = Some(output.clone());
    }
}
