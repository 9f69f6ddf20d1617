//! Main entry points for YAML-based training

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::TrainSpec;
use crate::config::validate::validate_config;
use crate::data::{Corpus, IntegerEncoder, LanguageModelingDataset};
use crate::error::{Error, Result};
use crate::gan::{EpochReport, LossSummary, ModelBundle, TrainingScheduler};

/// Everything built from a spec before the first update
pub struct Pipeline {
    pub corpus: Corpus,
    pub encoder: IntegerEncoder,
    pub dataset: LanguageModelingDataset,
    pub scheduler: TrainingScheduler,
}

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub summary: LossSummary,
    pub history: Vec<EpochReport>,
    pub vocab_size: usize,
    /// Parameter bundle path, when one was written
    pub output: Option<PathBuf>,
}

/// Load training spec from YAML file (without running training)
///
/// Read and parse failures are [`Error::ConfigError`]; range checks keep
/// their own kinds (see [`crate::config::ValidationError`]).
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<TrainSpec> {
    let yaml_content = fs::read_to_string(config_path.as_ref()).map_err(|e| {
        Error::ConfigError(format!(
            "Failed to read config file {}: {}",
            config_path.as_ref().display(),
            e
        ))
    })?;

    let spec: TrainSpec = serde_yaml::from_str(&yaml_content)
        .map_err(|e| Error::ConfigError(format!("Failed to parse YAML config: {e}")))?;

    validate_config(&spec)?;

    Ok(spec)
}

/// Read the corpus, learn its vocabulary, window it and build the scheduler
pub fn build_pipeline(spec: &TrainSpec) -> Result<Pipeline> {
    let corpus = Corpus::from_file(&spec.data.path, spec.data.corpus_type()?)?;
    let encoder = IntegerEncoder::learn(&corpus);
    let tokens = encoder.encode(corpus.tokens())?;
    tracing::info!(
        path = %spec.data.path.display(),
        tokens = tokens.len(),
        vocab_size = encoder.vocab_size(),
        "corpus loaded"
    );

    let dataset = LanguageModelingDataset::new(
        &tokens,
        encoder.vocab_size(),
        spec.data.max_length,
        spec.data.batch_size,
        spec.data.shuffle,
        spec.training.seed.unwrap_or_default(),
    )?;

    let model = spec.model.to_config(encoder.vocab_size(), spec.data.max_length);
    let scheduler = TrainingScheduler::new(model, spec.training.clone())?;

    Ok(Pipeline { corpus, encoder, dataset, scheduler })
}

/// Run the full schedule for a loaded spec and save the bundle if configured
pub fn train_from_spec(spec: &TrainSpec) -> Result<TrainOutcome> {
    let Pipeline { encoder, mut dataset, mut scheduler, .. } = build_pipeline(spec)?;

    let summary = scheduler.run(&mut dataset)?;

    if let Some(path) = &spec.output {
        save_bundle(&scheduler.export(), path)?;
        tracing::info!(path = %path.display(), "parameter bundle saved");
    }

    Ok(TrainOutcome {
        summary,
        history: scheduler.history().to_vec(),
        vocab_size: encoder.vocab_size(),
        output: spec.output.clone(),
    })
}

/// Train from a YAML configuration file
///
/// # Example
///
/// ```no_run
/// use maligan::config::train_from_yaml;
///
/// let outcome = train_from_yaml("config.yaml")?;
/// println!("{:?}", outcome.summary);
/// # Ok::<(), maligan::Error>(())
/// ```
pub fn train_from_yaml<P: AsRef<Path>>(config_path: P) -> Result<TrainOutcome> {
    let spec = load_config(config_path)?;
    train_from_spec(&spec)
}

fn save_bundle(bundle: &ModelBundle, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    bundle.save_json(path)
}
