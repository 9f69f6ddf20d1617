//! Embedding lookup

use crate::autograd::tensor::GradCell;
use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Gather rows of a `vocab × dim` table
///
/// Output is `ids.len() × dim`, row `i` being `table[ids[i]]`. Callers can
/// order `ids` so consecutive rows form larger windows (the discriminator
/// lays out `k` consecutive tokens to get one `k·dim` convolution patch per
/// output row).
pub fn embedding(table: &Tensor, ids: &[u32], dim: usize) -> Tensor {
    assert!(dim > 0, "embedding: dim must be > 0");
    assert_eq!(table.len() % dim, 0, "embedding: table size must be a multiple of dim");
    let vocab = table.len() / dim;

    let src = table.data();
    let mut data = Vec::with_capacity(ids.len() * dim);
    for &id in ids {
        let row = id as usize;
        assert!(row < vocab, "embedding: id {row} out of range for vocab {vocab}");
        data.extend(src.iter().skip(row * dim).take(dim));
    }

    let requires_grad = table.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(EmbeddingBackward {
            table: table.clone(),
            ids: ids.to_vec(),
            dim,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct EmbeddingBackward {
    table: Tensor,
    ids: Vec<u32>,
    dim: usize,
    result_grad: GradCell,
}

impl BackwardOp for EmbeddingBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            // Scatter-add each output row back onto its table row
            let mut grad_table = Array1::zeros(self.table.len());
            for (i, &id) in self.ids.iter().enumerate() {
                let dst = id as usize * self.dim;
                let src = i * self.dim;
                for j in 0..self.dim {
                    grad_table[dst + j] += grad[src + j];
                }
            }
            self.table.accumulate_grad(grad_table);
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.table]
    }
}
