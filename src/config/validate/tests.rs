//! Unit tests for configuration validation

use super::error::ValidationError;
use super::validator::validate_config;
use crate::config::schema::*;
use crate::error::Error;
use crate::gan::TrainingConfig;
use proptest::prelude::*;
use tempfile::TempDir;

/// A valid spec whose corpus file lives in the returned directory
fn create_valid_spec() -> (TempDir, TrainSpec) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("corpus.txt");
    std::fs::write(&path, "abcabcabc").unwrap();
    let spec = TrainSpec {
        data: DataSpec {
            path,
            corpus_type: "char".into(),
            max_length: 4,
            batch_size: 2,
            shuffle: false,
        },
        model: ModelSpec { n_filters: vec![8, 8], filters_size: vec![1, 3], ..Default::default() },
        training: TrainingConfig::default(),
        output: None,
    };
    (dir, spec)
}

#[test]
fn test_valid_config() {
    let (_dir, spec) = create_valid_spec();
    assert!(validate_config(&spec).is_ok());
}

#[test]
fn test_missing_corpus() {
    let (dir, mut spec) = create_valid_spec();
    spec.data.path = dir.path().join("absent.txt");
    let err = validate_config(&spec).unwrap_err();
    assert!(matches!(err, ValidationError::DataNotFound(_)));
    assert!(matches!(Error::from(err), Error::ConfigError(_)));
}

#[test]
fn test_unsupported_corpus_type() {
    let (_dir, mut spec) = create_valid_spec();
    spec.data.corpus_type = "sentence".into();
    let err = validate_config(&spec).unwrap_err();
    assert_eq!(err, ValidationError::UnsupportedCorpusType("sentence".into()));
    assert!(matches!(Error::from(err), Error::UnsupportedCorpusType(_)));
}

#[test]
fn test_invalid_batch_size() {
    let (_dir, mut spec) = create_valid_spec();
    spec.data.batch_size = 0;
    let err = validate_config(&spec).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidBatchSize(0)));
}

#[test]
fn test_invalid_temperature_keeps_its_kind() {
    let (_dir, mut spec) = create_valid_spec();
    spec.model.temperature = 0.0;
    let err = validate_config(&spec).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidTemperature(_)));
    assert!(matches!(Error::from(err), Error::InvalidTemperature(_)));
}

#[test]
fn test_filter_wider_than_sequence() {
    let (_dir, mut spec) = create_valid_spec();
    spec.model.filters_size = vec![1, 5];
    let err = validate_config(&spec).unwrap_err();
    assert!(matches!(err, ValidationError::InvalidFilters(_)));
    assert!(matches!(Error::from(err), Error::InvalidConfig(_)));
}

#[test]
fn test_mismatched_filter_lists() {
    let (_dir, mut spec) = create_valid_spec();
    spec.model.n_filters = vec![8];
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidFilters(_))));
}

#[test]
fn test_zero_counts() {
    let (_dir, mut spec) = create_valid_spec();
    spec.training.n_rollouts = 0;
    let err = validate_config(&spec).unwrap_err();
    assert_eq!(err, ValidationError::InvalidCount { name: "n_rollouts", value: 0 });
    assert!(err.to_string().contains("n_rollouts"));
}

#[test]
fn test_invalid_grad_clip() {
    let (_dir, mut spec) = create_valid_spec();
    spec.training.max_grad_norm = Some(-1.0);
    assert!(matches!(validate_config(&spec), Err(ValidationError::InvalidGradClip(_))));

    spec.training.max_grad_norm = None;
    assert!(validate_config(&spec).is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_learning_rate_range(lr in -1.0f32..2.0) {
        let (_dir, mut spec) = create_valid_spec();
        spec.training.d_learning_rate = lr;
        let valid = lr > 0.0 && lr <= 1.0;
        prop_assert_eq!(validate_config(&spec).is_ok(), valid);
    }

    #[test]
    fn prop_dropout_range(rate in -0.5f32..1.5) {
        let (_dir, mut spec) = create_valid_spec();
        spec.model.dropout_rate = rate;
        let valid = (0.0..1.0).contains(&rate);
        prop_assert_eq!(validate_config(&spec).is_ok(), valid);
    }
}
