//! Token ↔ index mapping

use super::Corpus;
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Maps each vocabulary token to its position in the corpus vocabulary
#[derive(Debug, Clone)]
pub struct IntegerEncoder {
    index: HashMap<String, u32>,
    vocab: Vec<String>,
}

impl IntegerEncoder {
    /// Learn the mapping from a corpus vocabulary
    pub fn learn(corpus: &Corpus) -> Self {
        Self::from_vocab(corpus.vocab().to_vec())
    }

    pub fn from_vocab(vocab: Vec<String>) -> Self {
        let index = vocab.iter().enumerate().map(|(i, t)| (t.clone(), i as u32)).collect();
        Self { index, vocab }
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    pub fn vocab(&self) -> &[String] {
        &self.vocab
    }

    pub fn encode(&self, tokens: &[String]) -> Result<Vec<u32>> {
        tokens
            .iter()
            .map(|t| self.index.get(t).copied().ok_or_else(|| Error::UnknownToken(t.clone())))
            .collect()
    }

    pub fn decode(&self, indices: &[u32]) -> Result<Vec<String>> {
        indices
            .iter()
            .map(|&i| {
                self.vocab.get(i as usize).cloned().ok_or(Error::TokenOutOfRange {
                    token: i,
                    vocab_size: self.vocab.len(),
                })
            })
            .collect()
    }
}
