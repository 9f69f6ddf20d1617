//! Monte Carlo rewards for sampled sequences

use ndarray::{Array1, Array2, Axis};

use super::discriminator::{SequenceScorer, REAL_CLASS};
use super::SequenceBatch;
use crate::error::{Error, Result};

/// Sum magnitude below which normalization is undefined
const NORMALIZATION_EPS: f32 = 1e-8;

/// Per-position weights for the policy-gradient loss, shaped like `x_fake`
///
/// Every position of a sequence carries that sequence's normalized reward.
#[derive(Clone, Debug, PartialEq)]
pub struct Reward {
    values: Array2<f32>,
}

impl Reward {
    /// Broadcast one value per sequence across `length` positions
    pub fn from_sequence_rewards(per_sequence: &[f32], length: usize) -> Self {
        let rows = per_sequence.len();
        let values = Array2::from_shape_fn((rows, length), |(b, _)| per_sequence[b]);
        Self { values }
    }

    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Weights of every sequence at position `t`
    pub fn column(&self, t: usize) -> Vec<f32> {
        self.values.column(t).to_vec()
    }

    /// One reward per sequence
    pub fn per_sequence(&self) -> Vec<f32> {
        self.values.column(0).to_vec()
    }
}

/// Estimates rewards from a scorer's opinion of generated sequences
pub struct RewardEstimator;

impl RewardEstimator {
    /// Reward for every sequence of `x_fake`
    ///
    /// The scorer evaluates the batch `n_rollouts` times. Each sequence's raw
    /// reward is its mean probability of being real. Raw rewards are divided
    /// by their batch sum and then centered, see [`normalize`].
    pub fn estimate<S>(x_fake: &SequenceBatch, n_rollouts: usize, scorer: &S) -> Result<Reward>
    where
        S: SequenceScorer + ?Sized,
    {
        if n_rollouts == 0 {
            return Err(Error::InvalidConfig("n_rollouts must be >= 1".into()));
        }
        let (batch_size, length) = x_fake.shape();

        let mut total = Array1::<f32>::zeros(batch_size);
        for rollout in 0..n_rollouts {
            let logits = scorer.score(x_fake)?;
            if logits.dim() != (batch_size, 2) {
                let (rows, cols) = logits.dim();
                return Err(Error::ShapeMismatch {
                    context: "scorer output".into(),
                    expected: vec![batch_size, 2],
                    actual: vec![rows, cols],
                });
            }
            total += &real_probability(&logits);
            tracing::trace!(rollout, "scored rollout");
        }
        let raw = (total / n_rollouts as f32).to_vec();

        let normalized = normalize(&raw);
        Ok(Reward::from_sequence_rewards(&normalized, length))
    }
}

/// Softmax probability of the real class for every row of `(n, 2)` logits
fn real_probability(logits: &Array2<f32>) -> Array1<f32> {
    logits.map_axis(Axis(1), |row| {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let denom: f32 = row.iter().map(|&v| (v - max).exp()).sum();
        (row[REAL_CLASS] - max).exp() / denom
    })
}

/// `r / Σr − mean(r / Σr)`
///
/// The result always sums to zero. When `Σr` is zero, nearly zero, or not
/// finite the division is undefined and every reward is zero, so the
/// generator is left unchanged by that batch.
pub fn normalize(raw: &[f32]) -> Vec<f32> {
    let sum: f32 = raw.iter().sum();
    if !sum.is_finite() || sum.abs() < NORMALIZATION_EPS {
        tracing::warn!(sum, "reward sum is degenerate; using zero rewards");
        return vec![0.0; raw.len()];
    }
    let scaled: Vec<f32> = raw.iter().map(|r| r / sum).collect();
    let mean = scaled.iter().sum::<f32>() / scaled.len().max(1) as f32;
    scaled.into_iter().map(|r| r - mean).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use std::cell::Cell;

    /// Returns the same logits for every row and counts its calls
    struct FixedScorer {
        logits: [f32; 2],
        calls: Cell<usize>,
    }

    impl FixedScorer {
        fn new(real: f32, fake: f32) -> Self {
            Self { logits: [real, fake], calls: Cell::new(0) }
        }
    }

    impl SequenceScorer for FixedScorer {
        fn score(&self, batch: &SequenceBatch) -> Result<Array2<f32>> {
            self.calls.set(self.calls.get() + 1);
            Ok(Array2::from_shape_fn((batch.batch_size(), 2), |(_, c)| self.logits[c]))
        }
    }

    /// Scores row `b` by its first token, so rows get different rewards
    struct FirstTokenScorer;

    impl SequenceScorer for FirstTokenScorer {
        fn score(&self, batch: &SequenceBatch) -> Result<Array2<f32>> {
            Ok(Array2::from_shape_fn((batch.batch_size(), 2), |(b, c)| {
                if c == REAL_CLASS {
                    batch.row(b)[0] as f32
                } else {
                    0.0
                }
            }))
        }
    }

    fn fake_batch() -> SequenceBatch {
        SequenceBatch::from_rows(&[vec![0, 1, 2], vec![3, 1, 1], vec![2, 2, 0]], 4).unwrap()
    }

    #[test]
    fn test_constant_scorer_gives_zero_rewards() {
        let scorer = FixedScorer::new(0.3, -0.2);
        let reward = RewardEstimator::estimate(&fake_batch(), 3, &scorer).unwrap();
        assert_eq!(reward.shape(), (3, 3));
        for v in reward.values() {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-6);
        }
        assert_eq!(scorer.calls.get(), 3);
    }

    #[test]
    fn test_reward_repeats_across_positions() {
        let reward = RewardEstimator::estimate(&fake_batch(), 2, &FirstTokenScorer).unwrap();
        let per_sequence = reward.per_sequence();
        for t in 0..3 {
            assert_eq!(reward.column(t), per_sequence);
        }
        // Higher first token means more real-looking, hence a larger reward
        assert!(per_sequence[1] > per_sequence[2]);
        assert!(per_sequence[2] > per_sequence[0]);
    }

    #[test]
    fn test_zero_sum_gives_zero_rewards() {
        let scorer = FixedScorer::new(-1000.0, 0.0);
        let reward = RewardEstimator::estimate(&fake_batch(), 1, &scorer).unwrap();
        assert!(reward.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_rollouts_rejected() {
        let scorer = FixedScorer::new(0.0, 0.0);
        let err = RewardEstimator::estimate(&fake_batch(), 0, &scorer).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_wrong_scorer_shape_rejected() {
        struct OneColumn;
        impl SequenceScorer for OneColumn {
            fn score(&self, batch: &SequenceBatch) -> Result<Array2<f32>> {
                Ok(Array2::zeros((batch.batch_size(), 1)))
            }
        }
        let err = RewardEstimator::estimate(&fake_batch(), 1, &OneColumn).unwrap_err();
        assert!(matches!(err, Error::ShapeMismatch { .. }));
    }

    #[test]
    fn test_normalize_known_values() {
        // [1, 3] / 4 = [0.25, 0.75], mean 0.5
        let r = normalize(&[1.0, 3.0]);
        assert_abs_diff_eq!(r[0], -0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(r[1], 0.25, epsilon = 1e-6);
    }

    proptest! {
        #[test]
        fn prop_normalized_rewards_sum_to_zero(
            raw in prop::collection::vec(0.01f32..1.0, 1..16)
        ) {
            let r = normalize(&raw);
            let total: f32 = r.iter().sum();
            prop_assert!(total.abs() < 1e-4);
        }

        #[test]
        fn prop_normalize_preserves_order(
            raw in prop::collection::vec(0.01f32..1.0, 2..16)
        ) {
            let r = normalize(&raw);
            for i in 1..raw.len() {
                if raw[i] > raw[i - 1] {
                    prop_assert!(r[i] >= r[i - 1]);
                }
            }
        }
    }
}
