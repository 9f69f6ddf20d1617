//! Restartable sources of real training batches

use super::SequenceBatch;

/// One `(input, next-token target)` pair of equally shaped batches
pub type BatchPair = (SequenceBatch, SequenceBatch);

/// Produces the real batches of one epoch
///
/// Each call to [`BatchSource::batches`] starts a fresh pass. Successive passes
/// must agree in batch count and shape; their order may differ when the
/// source reshuffles between epochs.
pub trait BatchSource {
    fn batches(&mut self) -> Box<dyn Iterator<Item = BatchPair> + '_>;

    /// Number of batches one pass yields
    fn num_batches(&self) -> usize;
}

/// A fixed in-memory list of batches, replayed in order every epoch
impl BatchSource for Vec<BatchPair> {
    fn batches(&mut self) -> Box<dyn Iterator<Item = BatchPair> + '_> {
        Box::new(self.iter().cloned())
    }

    fn num_batches(&self) -> usize {
        self.len()
    }
}
