//! Fixed-length next-token windows over an encoded token stream

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{Error, Result};
use crate::gan::{BatchPair, BatchSource, SequenceBatch};

/// Batches of `(x, y)` windows for language modeling
///
/// The stream is cut into non-overlapping windows of `max_length + 1`
/// tokens; `x` is a window without its last token and `y` the same window
/// without its first. Leftover tokens and a trailing partial batch are
/// dropped so every batch is `(batch_size, max_length)`.
#[derive(Debug, Clone)]
pub struct LanguageModelingDataset {
    windows: SequenceBatch,
    max_length: usize,
    batch_size: usize,
    shuffle: bool,
    order: Vec<usize>,
    rng: StdRng,
}

impl LanguageModelingDataset {
    pub fn new(
        tokens: &[u32],
        vocab_size: usize,
        max_length: usize,
        batch_size: usize,
        shuffle: bool,
        seed: u64,
    ) -> Result<Self> {
        if max_length == 0 || batch_size == 0 {
            return Err(Error::InvalidConfig(format!(
                "max_length ({max_length}) and batch_size ({batch_size}) must be >= 1"
            )));
        }
        let width = max_length + 1;
        let count = tokens.len() / width;
        if count < batch_size {
            return Err(Error::InvalidConfig(format!(
                "{} tokens make {count} windows of {width}, fewer than one batch of {batch_size}",
                tokens.len()
            )));
        }

        let rows: Vec<Vec<u32>> = tokens.chunks_exact(width).map(<[u32]>::to_vec).collect();
        let windows = SequenceBatch::from_rows(&rows, vocab_size)?;

        Ok(Self {
            windows,
            max_length,
            batch_size,
            shuffle,
            order: (0..count).collect(),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Number of `max_length + 1` windows
    pub fn num_windows(&self) -> usize {
        self.windows.batch_size()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn vocab_size(&self) -> usize {
        self.windows.vocab_size()
    }
}

impl BatchSource for LanguageModelingDataset {
    /// One epoch of batches; reshuffles window order first when enabled
    fn batches(&mut self) -> Box<dyn Iterator<Item = BatchPair> + '_> {
        if self.shuffle {
            self.order.shuffle(&mut self.rng);
        }
        let length = self.max_length;
        let windows = &self.windows;
        Box::new(self.order.chunks_exact(self.batch_size).map(move |picks| {
            let rows = windows.select_rows(picks);
            (rows.slice_positions(0..length), rows.slice_positions(1..length + 1))
        }))
    }

    fn num_batches(&self) -> usize {
        self.order.len() / self.batch_size
    }
}
