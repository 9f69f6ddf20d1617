//! Text corpora and language-modeling batches
//!
//! - [`Corpus`]: character or word tokens with a sorted vocabulary
//! - [`IntegerEncoder`]: token ↔ index mapping learned from a corpus
//! - [`LanguageModelingDataset`]: `(x, y)` next-token windows, a [`crate::gan::BatchSource`]

mod corpus;
mod dataset;
mod encoder;

pub use corpus::{Corpus, CorpusType};
pub use dataset::LanguageModelingDataset;
pub use encoder::IntegerEncoder;
