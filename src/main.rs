//! MaliGAN CLI
//!
//! # Usage
//!
//! ```bash
//! # Pretrain and adversarially train from config
//! maligan train config.yaml
//!
//! # Train with overrides
//! maligan train config.yaml --epochs 10 --seed 7
//!
//! # Validate config
//! maligan validate config.yaml --detailed
//!
//! # Sample from the trained generator
//! maligan sample config.yaml --length 40 -n 5
//! ```
//!
//! Log output goes to stderr. `MALIGAN_LOG` takes a target filter such as
//! `maligan=debug` or `maligan::gan=trace` and overrides `--verbose`/`--quiet`.

use clap::Parser;
use maligan::cli::{run_command, Cli, LogLevel};
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(level: LogLevel) {
    let targets = std::env::var("MALIGAN_LOG")
        .ok()
        .and_then(|spec| Targets::from_str(&spec).ok())
        .unwrap_or_else(|| Targets::new().with_default(level.filter()));

    tracing_subscriber::registry()
        .with(targets)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(LogLevel::from_flags(cli.quiet, cli.verbose));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
