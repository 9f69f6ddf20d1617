//! Rectangular batches of token sequences

use crate::error::{Error, Result};
use ndarray::{s, Array2, ArrayView1, Axis};
use std::ops::Range;

/// A `(batch_size, length)` block of token indices
///
/// Every token is checked against the vocabulary on construction, so any
/// `SequenceBatch` in hand satisfies `token < vocab_size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceBatch {
    tokens: Array2<u32>,
    vocab_size: usize,
}

impl SequenceBatch {
    /// Wrap a token matrix, validating shape and token range
    pub fn new(tokens: Array2<u32>, vocab_size: usize) -> Result<Self> {
        if vocab_size == 0 {
            return Err(Error::InvalidVocabSize(vocab_size));
        }
        let (rows, cols) = tokens.dim();
        if rows == 0 || cols == 0 {
            return Err(Error::ShapeMismatch {
                context: "empty sequence batch".into(),
                expected: vec![1, 1],
                actual: vec![rows, cols],
            });
        }
        if let Some(&token) = tokens.iter().find(|&&t| t as usize >= vocab_size) {
            return Err(Error::TokenOutOfRange { token, vocab_size });
        }
        Ok(Self { tokens, vocab_size })
    }

    /// Build from equally long rows
    pub fn from_rows(rows: &[Vec<u32>], vocab_size: usize) -> Result<Self> {
        let length = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != length) {
            return Err(Error::ShapeMismatch {
                context: "ragged rows".into(),
                expected: vec![length],
                actual: vec![bad.len()],
            });
        }
        let flat: Vec<u32> = rows.iter().flatten().copied().collect();
        let tokens = Array2::from_shape_vec((rows.len(), length), flat).map_err(|e| {
            Error::ShapeMismatch {
                context: format!("from_rows: {e}"),
                expected: vec![rows.len(), length],
                actual: vec![rows.len() * length],
            }
        })?;
        Self::new(tokens, vocab_size)
    }

    /// `(batch_size, length)`
    pub fn shape(&self) -> (usize, usize) {
        self.tokens.dim()
    }

    pub fn batch_size(&self) -> usize {
        self.tokens.nrows()
    }

    pub fn length(&self) -> usize {
        self.tokens.ncols()
    }

    pub fn vocab_size(&self) -> usize {
        self.vocab_size
    }

    /// Token matrix
    pub fn tokens(&self) -> &Array2<u32> {
        &self.tokens
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, u32> {
        self.tokens.row(i)
    }

    /// Tokens at position `j` of every row
    pub fn column(&self, j: usize) -> Vec<u32> {
        self.tokens.column(j).to_vec()
    }

    /// Row-major copy of all tokens
    pub fn to_flat(&self) -> Vec<u32> {
        self.tokens.iter().copied().collect()
    }

    /// Stack `other` below `self`
    ///
    /// Fails with [`Error::ShapeMismatch`] when lengths or vocabularies differ.
    pub fn concat(&self, other: &SequenceBatch) -> Result<SequenceBatch> {
        if self.length() != other.length() || self.vocab_size != other.vocab_size {
            return Err(Error::ShapeMismatch {
                context: "concatenating real and fake batches".into(),
                expected: vec![self.length(), self.vocab_size],
                actual: vec![other.length(), other.vocab_size],
            });
        }
        let tokens = ndarray::concatenate(Axis(0), &[self.tokens.view(), other.tokens.view()])
            .map_err(|e| Error::ShapeMismatch {
                context: format!("concatenate: {e}"),
                expected: vec![self.batch_size(), self.length()],
                actual: vec![other.batch_size(), other.length()],
            })?;
        Ok(SequenceBatch { tokens, vocab_size: self.vocab_size })
    }

    /// Positions `range` of every row
    ///
    /// # Panics
    ///
    /// If `range` is empty or ends past `length()`.
    pub fn slice_positions(&self, range: Range<usize>) -> SequenceBatch {
        assert!(
            !range.is_empty() && range.end <= self.length(),
            "position range {range:?} out of bounds for length {}",
            self.length()
        );
        SequenceBatch {
            tokens: self.tokens.slice(s![.., range]).to_owned(),
            vocab_size: self.vocab_size,
        }
    }

    /// Gather rows by index, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> SequenceBatch {
        SequenceBatch {
            tokens: self.tokens.select(Axis(0), indices),
            vocab_size: self.vocab_size,
        }
    }
}
