//! Configuration validation logic

use super::error::ValidationError;
use crate::config::schema::TrainSpec;
use crate::data::CorpusType;

/// Validate a training specification
///
/// Checks:
/// - The corpus file exists and its corpus type is known
/// - Sizes, counts and rates are in range
/// - Every discriminator filter fits the sequence length
pub fn validate_config(spec: &TrainSpec) -> Result<(), ValidationError> {
    if !spec.data.path.exists() {
        return Err(ValidationError::DataNotFound(spec.data.path.display().to_string()));
    }

    if spec.data.corpus_type.parse::<CorpusType>().is_err() {
        return Err(ValidationError::UnsupportedCorpusType(spec.data.corpus_type.clone()));
    }

    if spec.data.batch_size == 0 {
        return Err(ValidationError::InvalidBatchSize(spec.data.batch_size));
    }

    let max_length = spec.data.max_length;
    if max_length == 0 {
        return Err(ValidationError::InvalidMaxLength(max_length));
    }

    let model = &spec.model;
    let dims = [("embedding_size", model.embedding_size), ("hidden_size", model.hidden_size)];
    for (name, value) in dims {
        if value == 0 {
            return Err(ValidationError::InvalidDimension { name, value });
        }
    }

    if !(model.temperature.is_finite() && model.temperature > 0.0) {
        return Err(ValidationError::InvalidTemperature(model.temperature));
    }

    if !(0.0..1.0).contains(&model.dropout_rate) {
        return Err(ValidationError::InvalidDropout(model.dropout_rate));
    }

    if model.n_filters.is_empty() || model.n_filters.len() != model.filters_size.len() {
        return Err(ValidationError::InvalidFilters(format!(
            "n_filters ({}) and filters_size ({}) must be non-empty and of equal length",
            model.n_filters.len(),
            model.filters_size.len()
        )));
    }
    if model.n_filters.contains(&0) {
        return Err(ValidationError::InvalidFilters("n_filters entries must be > 0".into()));
    }
    if let Some(&k) = model.filters_size.iter().find(|&&k| k == 0 || k > max_length) {
        return Err(ValidationError::InvalidFilters(format!(
            "filter size {k} must be in [1, max_length = {max_length}]"
        )));
    }

    let training = &spec.training;
    let counts = [
        ("g_epochs", training.g_epochs),
        ("d_epochs", training.d_epochs),
        ("d_steps", training.d_steps),
        ("n_rollouts", training.n_rollouts),
        ("epochs", training.epochs),
    ];
    for (name, value) in counts {
        if value == 0 {
            return Err(ValidationError::InvalidCount { name, value });
        }
    }

    let rates = [
        ("g_learning_rate", training.g_learning_rate),
        ("d_learning_rate", training.d_learning_rate),
    ];
    for (name, value) in rates {
        if !(value > 0.0 && value <= 1.0) {
            return Err(ValidationError::InvalidLearningRate { name, value });
        }
    }

    if let Some(clip) = training.max_grad_norm {
        if !(clip.is_finite() && clip > 0.0) {
            return Err(ValidationError::InvalidGradClip(clip));
        }
    }

    Ok(())
}
