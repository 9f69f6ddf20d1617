//! Tokenized text and its vocabulary

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// How text is split into tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusType {
    /// One token per character
    #[default]
    Char,
    /// Whitespace-separated words
    Word,
}

impl FromStr for CorpusType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "char" => Ok(CorpusType::Char),
            "word" => Ok(CorpusType::Word),
            other => Err(Error::UnsupportedCorpusType(other.to_string())),
        }
    }
}

impl fmt::Display for CorpusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusType::Char => write!(f, "char"),
            CorpusType::Word => write!(f, "word"),
        }
    }
}

/// A token stream plus its sorted, deduplicated vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct Corpus {
    corpus_type: CorpusType,
    tokens: Vec<String>,
    vocab: Vec<String>,
}

impl Corpus {
    pub fn from_text(text: &str, corpus_type: CorpusType) -> Self {
        let tokens: Vec<String> = match corpus_type {
            CorpusType::Char => text.chars().map(String::from).collect(),
            CorpusType::Word => text.split_whitespace().map(String::from).collect(),
        };
        let mut vocab = tokens.clone();
        vocab.sort_unstable();
        vocab.dedup();
        Self { corpus_type, tokens, vocab }
    }

    /// Read and tokenize a UTF-8 text file
    pub fn from_file(path: impl AsRef<Path>, corpus_type: CorpusType) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_text(&text, corpus_type))
    }

    pub fn corpus_type(&self) -> CorpusType {
        self.corpus_type
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Distinct tokens in sorted order; a token's position is its index
    pub fn vocab(&self) -> &[String] {
        &self.vocab
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }
}
