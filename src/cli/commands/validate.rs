//! Validate command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{load_config, TrainSpec, ValidateArgs};

/// Format data configuration as a string
pub fn format_data_info(spec: &TrainSpec) -> String {
    [
        format!("  Corpus: {} ({})", spec.data.path.display(), spec.data.corpus_type),
        format!("  Sequence length: {}", spec.data.max_length),
        format!("  Batch size: {}", spec.data.batch_size),
        format!("  Shuffle: {}", spec.data.shuffle),
    ]
    .join("\n")
}

/// Format network configuration as a string
pub fn format_model_info(spec: &TrainSpec) -> String {
    let model = &spec.model;
    [
        format!("  Embedding size: {}", model.embedding_size),
        format!("  Hidden size: {}", model.hidden_size),
        format!("  Temperature: {}", model.temperature),
        format!("  Filters: {:?} of widths {:?}", model.n_filters, model.filters_size),
        format!("  Dropout: {}", model.dropout_rate),
    ]
    .join("\n")
}

/// Format the phase schedule as a string
pub fn format_training_info(spec: &TrainSpec) -> String {
    let training = &spec.training;
    let mut lines = vec![
        format!("  Generator pretraining epochs: {}", training.g_epochs),
        format!(
            "  Discriminator epochs: {} ({} steps each)",
            training.d_epochs, training.d_steps
        ),
        format!("  Adversarial epochs: {}", training.epochs),
        format!("  Rollouts: {}", training.n_rollouts),
        format!(
            "  Optimizer: {:?} (g lr={}, d lr={})",
            training.optimizer, training.g_learning_rate, training.d_learning_rate
        ),
    ];
    if let Some(clip) = training.max_grad_norm {
        lines.push(format!("  Gradient clipping: {clip}"));
    }
    if let Some(output) = &spec.output {
        lines.push(format!("  Output: {}", output.display()));
    }
    lines.join("\n")
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed {
        log(level, LogLevel::Normal, "");
        log(level, LogLevel::Normal, "Configuration Summary:");
        for section in [
            format_data_info(&spec),
            format_model_info(&spec),
            format_training_info(&spec),
        ] {
            log(level, LogLevel::Normal, &section);
            log(level, LogLevel::Normal, "");
        }
    }

    Ok(())
}
