//! Ops whose output shape differs from their input: bias broadcast and total sum

use crate::autograd::tensor::GradCell;
use crate::autograd::{BackwardOp, Tensor};
use ndarray::{Array1, Axis};
use std::rc::Rc;

/// Add `bias` (length `cols`) to each row of a row-major `rows × cols` matrix
pub fn add_row_broadcast(a: &Tensor, bias: &Tensor, rows: usize, cols: usize) -> Tensor {
    assert_eq!(a.len(), rows * cols, "add_row_broadcast: matrix size mismatch");
    assert_eq!(bias.len(), cols, "add_row_broadcast: bias size mismatch");

    let mut data = a.data().clone();
    for mut row in data.exact_chunks_mut(cols.max(1)) {
        row += bias.data();
    }

    let tracked = a.requires_grad() || bias.requires_grad();
    let mut out = Tensor::new(data, tracked);
    if tracked {
        out.set_backward_op(Rc::new(BiasBackward {
            matrix: a.clone(),
            bias: bias.clone(),
            rows,
            cols,
            out: out.grad_cell(),
        }));
    }
    out
}

struct BiasBackward {
    matrix: Tensor,
    bias: Tensor,
    rows: usize,
    cols: usize,
    out: GradCell,
}

impl BackwardOp for BiasBackward {
    fn backward(&self) {
        let Some(grad) = self.out.borrow().clone() else {
            return;
        };
        if self.bias.requires_grad() {
            let column_sums = match grad.view().into_shape_with_order((self.rows, self.cols)) {
                Ok(m) => m.sum_axis(Axis(0)),
                Err(_) => Array1::zeros(self.cols),
            };
            self.bias.accumulate_grad(column_sums);
        }
        if self.matrix.requires_grad() {
            self.matrix.accumulate_grad(grad);
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.matrix, &self.bias]
    }
}

/// Scalar total of every element
pub fn sum(a: &Tensor) -> Tensor {
    let mut out = Tensor::from_vec(vec![a.data().sum()], a.requires_grad());
    if a.requires_grad() {
        out.set_backward_op(Rc::new(SumBackward { input: a.clone(), out: out.grad_cell() }));
    }
    out
}

struct SumBackward {
    input: Tensor,
    out: GradCell,
}

impl BackwardOp for SumBackward {
    fn backward(&self) {
        if let Some(g) = self.out.borrow().as_ref().map(|g| g[0]) {
            self.input.accumulate_grad(Array1::from_elem(self.input.len(), g));
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.input]
    }
}
