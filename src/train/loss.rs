//! Loss functions for the generator and discriminator updates

use crate::autograd::{add, scale, sparse_cross_entropy};
use crate::error::{Error, Result};
use crate::gan::{Reward, SequenceBatch};
use crate::Tensor;

/// Mean next-token cross-entropy over every position of `targets`
///
/// `step_logits[t]` holds the `(batch_size, vocab_size)` logits predicted for
/// position `t`. Without a reward this is the supervised pretraining loss.
/// With one, each position's cross-entropy is weighted by `reward[b, t]`,
/// giving the policy-gradient surrogate whose gradient pushes up the
/// likelihood of sequences with positive advantage and down for negative
/// ones. The weighted value can be negative since rewards are centered.
pub fn next_token_loss(
    step_logits: &[Tensor],
    targets: &SequenceBatch,
    reward: Option<&Reward>,
) -> Result<Tensor> {
    let (batch_size, length) = targets.shape();
    let vocab_size = targets.vocab_size();

    if step_logits.len() != length {
        return Err(Error::ShapeMismatch {
            context: "next-token logits per position".into(),
            expected: vec![length],
            actual: vec![step_logits.len()],
        });
    }
    if let Some(bad) = step_logits.iter().find(|l| l.len() != batch_size * vocab_size) {
        return Err(Error::ShapeMismatch {
            context: "next-token logits".into(),
            expected: vec![batch_size, vocab_size],
            actual: vec![bad.len()],
        });
    }
    if let Some(r) = reward {
        if r.shape() != targets.shape() {
            let (rb, rl) = r.shape();
            return Err(Error::ShapeMismatch {
                context: "reward weights".into(),
                expected: vec![batch_size, length],
                actual: vec![rb, rl],
            });
        }
    }

    let mut total: Option<Tensor> = None;
    for (t, logits) in step_logits.iter().enumerate() {
        let weights = reward.map(|r| r.column(t));
        let step =
            sparse_cross_entropy(logits, &targets.column(t), weights.as_deref(), vocab_size);
        total = Some(match total {
            Some(acc) => add(&acc, &step),
            None => step,
        });
    }

    // length >= 1 is guaranteed by SequenceBatch, so total is set
    let total = total.ok_or_else(|| Error::ShapeMismatch {
        context: "next-token loss over empty sequence".into(),
        expected: vec![1],
        actual: vec![0],
    })?;
    Ok(scale(&total, 1.0 / length as f32))
}

/// Two-class cross-entropy of `(n, 2)` logits against labels 0 = real, 1 = fake
///
/// Softmax over two logits is the sigmoid of their difference, so this is the
/// binary cross-entropy of the real/fake decision.
pub fn classification_loss(logits: &Tensor, labels: &[u32]) -> Result<Tensor> {
    if logits.len() != labels.len() * 2 {
        return Err(Error::ShapeMismatch {
            context: "discriminator logits".into(),
            expected: vec![labels.len(), 2],
            actual: vec![logits.len()],
        });
    }
    if let Some(&label) = labels.iter().find(|&&l| l > 1) {
        return Err(Error::TokenOutOfRange { token: label, vocab_size: 2 });
    }
    Ok(sparse_cross_entropy(logits, labels, None, 2))
}
