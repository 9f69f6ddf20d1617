//! Train command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{apply_overrides, load_config, train_from_spec, TrainArgs};

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("MaliGAN: Training from {}", args.config.display()),
    );

    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    apply_overrides(&mut spec, &args);

    if args.dry_run {
        log(level, LogLevel::Normal, "Dry run - config validated successfully");
        log(
            level,
            LogLevel::Verbose,
            &format!(
                "  Schedule: {} generator / {} discriminator pretraining, {} adversarial",
                spec.training.g_epochs, spec.training.d_epochs, spec.training.epochs
            ),
        );
        log(
            level,
            LogLevel::Verbose,
            &format!("  Batch size: {}", spec.data.batch_size),
        );
        return Ok(());
    }

    let outcome = train_from_spec(&spec).map_err(|e| format!("Training error: {e}"))?;

    let names = ["G pretrain", "D pretrain", "G adversarial", "D adversarial"];
    for (name, loss) in names.iter().zip(outcome.summary.as_array()) {
        if let Some(loss) = loss {
            log(level, LogLevel::Verbose, &format!("  {name} loss: {loss:.4}"));
        }
    }
    if let Some(path) = &outcome.output {
        log(level, LogLevel::Normal, &format!("Saved parameters to {}", path.display()));
    }
    log(level, LogLevel::Normal, "Training complete!");
    Ok(())
}
