//! YAML schema for declarative adversarial training

use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use crate::data::CorpusType;
use crate::error::Result;
use crate::gan::{MaliGanConfig, TrainingConfig};

/// Deserialize a bool from either a YAML boolean (`true`) or a quoted string (`"true"`).
fn deserialize_bool_lenient<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => Ok(b),
        BoolOrString::Str(s) => match s.to_lowercase().as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "expected 'true' or 'false', got '{other}'"
            ))),
        },
    }
}

/// Complete training specification
///
/// ```yaml
/// data:
///   path: corpus.txt
///   corpus_type: char
///   max_length: 10
///   batch_size: 16
/// model:
///   embedding_size: 32
///   hidden_size: 64
/// training:
///   g_epochs: 5
///   n_rollouts: 4
/// output: maligan.json
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainSpec {
    pub data: DataSpec,

    #[serde(default)]
    pub model: ModelSpec,

    #[serde(default)]
    pub training: TrainingConfig,

    /// Where the trained parameter bundle is written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

/// Corpus and batching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpec {
    /// UTF-8 text file
    pub path: PathBuf,

    /// `char` or `word`; kept as text so unknown kinds surface as a
    /// corpus-type error rather than a parse error
    #[serde(default = "default_corpus_type")]
    pub corpus_type: String,

    /// Tokens per training sequence
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Reshuffle window order every epoch
    #[serde(default, deserialize_with = "deserialize_bool_lenient")]
    pub shuffle: bool,
}

impl DataSpec {
    pub fn corpus_type(&self) -> Result<CorpusType> {
        self.corpus_type.parse()
    }
}

fn default_corpus_type() -> String {
    CorpusType::default().to_string()
}

fn default_max_length() -> usize {
    MaliGanConfig::default().max_length
}

fn default_batch_size() -> usize {
    16
}

/// Network architecture; the vocabulary size comes from the corpus and the
/// sequence length from [`DataSpec::max_length`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSpec {
    pub embedding_size: usize,
    pub hidden_size: usize,
    pub temperature: f32,
    pub n_filters: Vec<usize>,
    pub filters_size: Vec<usize>,
    pub dropout_rate: f32,
}

impl Default for ModelSpec {
    fn default() -> Self {
        let base = MaliGanConfig::default();
        Self {
            embedding_size: base.embedding_size,
            hidden_size: base.hidden_size,
            temperature: base.temperature,
            n_filters: base.n_filters,
            filters_size: base.filters_size,
            dropout_rate: base.dropout_rate,
        }
    }
}

impl ModelSpec {
    /// Full network configuration for a corpus of `vocab_size` tokens
    pub fn to_config(&self, vocab_size: usize, max_length: usize) -> MaliGanConfig {
        MaliGanConfig {
            vocab_size,
            embedding_size: self.embedding_size,
            hidden_size: self.hidden_size,
            max_length,
            temperature: self.temperature,
            n_filters: self.n_filters.clone(),
            filters_size: self.filters_size.clone(),
            dropout_rate: self.dropout_rate,
        }
    }
}
