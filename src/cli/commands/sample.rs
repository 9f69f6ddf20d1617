//! Sample command implementation

use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{build_pipeline, load_config, Pipeline, SampleArgs};
use crate::data::CorpusType;
use crate::gan::ModelBundle;

/// Join decoded tokens the way the corpus was split
pub fn join_tokens(tokens: &[String], corpus_type: CorpusType) -> String {
    match corpus_type {
        CorpusType::Char => tokens.concat(),
        CorpusType::Word => tokens.join(" "),
    }
}

/// Draw `args.count` samples and render them as text
///
/// Weights come from the configured output bundle when it exists, otherwise
/// the networks are freshly initialized.
pub fn sample_text(args: &SampleArgs) -> Result<Vec<String>, String> {
    let mut spec = load_config(&args.config).map_err(|e| format!("Config error: {e}"))?;
    if args.seed.is_some() {
        spec.training.seed = args.seed;
    }

    let Pipeline { corpus, encoder, mut scheduler, .. } =
        build_pipeline(&spec).map_err(|e| format!("Setup error: {e}"))?;

    if let Some(path) = spec.output.as_ref().filter(|p| p.exists()) {
        let bundle = ModelBundle::load_json(path).map_err(|e| format!("Load error: {e}"))?;
        scheduler.import(&bundle).map_err(|e| format!("Load error: {e}"))?;
    }

    let temperature = args.temperature.unwrap_or(spec.model.temperature);
    let (_, y) = scheduler
        .sample(args.count, args.length, temperature)
        .map_err(|e| format!("Sampling error: {e}"))?;

    (0..y.batch_size())
        .map(|i| {
            let ids: Vec<u32> = y.row(i).to_vec();
            let tokens = encoder.decode(&ids).map_err(|e| format!("Decode error: {e}"))?;
            Ok(join_tokens(&tokens, corpus.corpus_type()))
        })
        .collect()
}

pub fn run_sample(args: SampleArgs, level: LogLevel) -> Result<(), String> {
    log(
        level,
        LogLevel::Verbose,
        &format!("Sampling {} x {} tokens from {}", args.count, args.length, args.config.display()),
    );

    for text in sample_text(&args)? {
        println!("{text}");
    }
    Ok(())
}
