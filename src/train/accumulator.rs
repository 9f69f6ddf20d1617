//! Running mean of step losses

/// Mean of the scalar losses folded in since the last [`LossAccumulator::reset`]
///
/// Sums in `f64` so long epochs of small losses do not drift.
#[derive(Debug, Clone, Default)]
pub struct LossAccumulator {
    sum: f64,
    count: usize,
}

impl LossAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; called once at the start of every epoch
    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }

    pub fn update(&mut self, loss: f32) {
        self.sum += f64::from(loss);
        self.count += 1;
    }

    /// Mean loss, or 0.0 before the first update
    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            return 0.0;
        }
        (self.sum / self.count as f64) as f32
    }

    /// Number of losses folded in since the last reset
    pub fn count(&self) -> usize {
        self.count
    }
}
