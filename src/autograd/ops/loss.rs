//! Sparse softmax cross-entropy with optional per-row weights

use crate::autograd::tensor::GradCell;
use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Row-wise log-softmax of a `rows × classes` matrix
pub fn log_softmax_rows(logits: &[f32], classes: usize) -> Vec<f32> {
    let mut out = Vec::with_capacity(logits.len());
    for row in logits.chunks(classes) {
        let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        // x - (max + lse) cancels in f32 once |max| is large
        let lse = row.iter().map(|&x| (x - max).exp()).sum::<f32>().ln();
        out.extend(row.iter().map(|&x| (x - max) - lse));
    }
    out
}

/// Mean over rows of `weight_i · −log softmax(logits_i)[target_i]`
///
/// `logits` is `targets.len() × classes`. Without weights every row counts
/// once, giving ordinary next-token (or class-label) cross-entropy; with
/// weights it becomes the reward-weighted policy-gradient objective.
pub fn sparse_cross_entropy(
    logits: &Tensor,
    targets: &[u32],
    weights: Option<&[f32]>,
    classes: usize,
) -> Tensor {
    let rows = targets.len();
    assert!(rows > 0, "sparse_cross_entropy: empty batch");
    assert_eq!(logits.len(), rows * classes, "sparse_cross_entropy: logits size mismatch");
    if let Some(w) = weights {
        assert_eq!(w.len(), rows, "sparse_cross_entropy: one weight per row");
    }

    let log_probs = log_softmax_rows(&logits.data().to_vec(), classes);

    let inv_rows = 1.0 / rows as f32;
    let mut total = 0.0;
    let mut grads = vec![0.0; logits.len()];
    for (r, &target) in targets.iter().enumerate() {
        let t = target as usize;
        assert!(t < classes, "sparse_cross_entropy: target {t} out of range");
        let w = weights.map_or(1.0, |w| w[r]);
        let row = &log_probs[r * classes..(r + 1) * classes];
        total -= w * row[t];

        // ∂/∂logits = w · (softmax − one_hot) / rows
        for (c, &lp) in row.iter().enumerate() {
            let p = lp.exp();
            let indicator = if c == t { 1.0 } else { 0.0 };
            grads[r * classes + c] = w * (p - indicator) * inv_rows;
        }
    }

    let requires_grad = logits.requires_grad();
    let mut loss = Tensor::from_vec(vec![total * inv_rows], requires_grad);

    if requires_grad {
        let backward_op = Rc::new(CrossEntropyBackward {
            logits: logits.clone(),
            grad: Array1::from(grads),
            result_grad: loss.grad_cell(),
        });
        loss.set_backward_op(backward_op);
    }

    loss
}

struct CrossEntropyBackward {
    logits: Tensor,
    grad: Array1<f32>,
    result_grad: GradCell,
}

impl BackwardOp for CrossEntropyBackward {
    fn backward(&self) {
        if let Some(upstream) = self.result_grad.borrow().as_ref() {
            self.logits.accumulate_grad(&self.grad * upstream[0]);
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.logits]
    }
}
