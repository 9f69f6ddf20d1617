//! Shape operations: column concatenation and grouped max-pooling

use crate::autograd::tensor::GradCell;
use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Concatenate `rows × widths[i]` matrices side by side
pub fn concat_columns(parts: &[&Tensor], widths: &[usize], rows: usize) -> Tensor {
    assert_eq!(parts.len(), widths.len(), "concat_columns: one width per part");
    for (part, &w) in parts.iter().zip(widths) {
        assert_eq!(part.len(), rows * w, "concat_columns: part size mismatch");
    }
    let total: usize = widths.iter().sum();

    let mut data = Vec::with_capacity(rows * total);
    for r in 0..rows {
        for (part, &w) in parts.iter().zip(widths) {
            data.extend(part.data().iter().skip(r * w).take(w));
        }
    }

    let requires_grad = parts.iter().any(|p| p.requires_grad());
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(ConcatBackward {
            parts: parts.iter().map(|p| (*p).clone()).collect(),
            widths: widths.to_vec(),
            rows,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct ConcatBackward {
    parts: Vec<Tensor>,
    widths: Vec<usize>,
    rows: usize,
    result_grad: GradCell,
}

impl BackwardOp for ConcatBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            let total: usize = self.widths.iter().sum();
            let mut offset = 0;
            for (part, &w) in self.parts.iter().zip(&self.widths) {
                if part.requires_grad() {
                    let mut grad_part = Vec::with_capacity(self.rows * w);
                    for r in 0..self.rows {
                        let start = r * total + offset;
                        grad_part.extend(grad.iter().skip(start).take(w));
                    }
                    part.accumulate_grad(Array1::from(grad_part));
                }
                offset += w;
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        self.parts.iter().collect()
    }
}

/// Column-wise max over consecutive row groups
///
/// Input is `(groups · group_rows) × cols`, output is `groups × cols`. This is
/// max-pooling over time when each group holds one sequence's positions.
pub fn max_pool_groups(a: &Tensor, groups: usize, group_rows: usize, cols: usize) -> Tensor {
    assert!(group_rows > 0, "max_pool_groups: group_rows must be > 0");
    assert_eq!(a.len(), groups * group_rows * cols, "max_pool_groups: size mismatch");

    let src = a.data();
    let mut data = vec![f32::NEG_INFINITY; groups * cols];
    let mut argmax = vec![0usize; groups * cols];
    for g in 0..groups {
        for r in 0..group_rows {
            let row = g * group_rows + r;
            for c in 0..cols {
                let v = src[row * cols + c];
                let out = g * cols + c;
                if v > data[out] || r == 0 {
                    data[out] = v;
                    argmax[out] = row * cols + c;
                }
            }
        }
    }

    let requires_grad = a.requires_grad();
    let mut result = Tensor::new(Array1::from(data), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MaxPoolBackward {
            a: a.clone(),
            argmax,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MaxPoolBackward {
    a: Tensor,
    argmax: Vec<usize>,
    result_grad: GradCell,
}

impl BackwardOp for MaxPoolBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            // Gradient flows only to the winning element of each window
            let mut grad_a = Array1::zeros(self.a.len());
            for (out, &src) in self.argmax.iter().enumerate() {
                grad_a[src] += grad[out];
            }
            self.a.accumulate_grad(grad_a);
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, sum};

    #[test]
    fn test_concat_columns_interleaves_rows() {
        let a = Tensor::from_vec(vec![1.0, 2.0], false); // 2×1
        let b = Tensor::from_vec(vec![3.0, 4.0, 5.0, 6.0], false); // 2×2
        let c = concat_columns(&[&a, &b], &[1, 2], 2);
        assert_eq!(c.data().to_vec(), vec![1.0, 3.0, 4.0, 2.0, 5.0, 6.0]);
    }

    #[test]
    fn test_concat_columns_backward_splits() {
        let a = Tensor::from_vec(vec![1.0, 2.0], true);
        let b = Tensor::from_vec(vec![3.0, 4.0, 5.0, 6.0], true);
        let c = concat_columns(&[&a, &b], &[1, 2], 2);
        let weights = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], false);
        let mut loss = sum(&crate::autograd::mul(&c, &weights));
        backward(&mut loss, None);

        assert_eq!(a.grad().unwrap().to_vec(), vec![1.0, 4.0]);
        assert_eq!(b.grad().unwrap().to_vec(), vec![2.0, 3.0, 5.0, 6.0]);
    }

    #[test]
    fn test_max_pool_groups() {
        // 2 groups of 2 rows, 2 cols
        let a = Tensor::from_vec(vec![1.0, 8.0, 3.0, 2.0, -1.0, -5.0, -2.0, -4.0], true);
        let pooled = max_pool_groups(&a, 2, 2, 2);
        assert_eq!(pooled.data().to_vec(), vec![3.0, 8.0, -1.0, -4.0]);

        let mut loss = sum(&pooled);
        backward(&mut loss, None);
        assert_eq!(
            a.grad().unwrap().to_vec(),
            vec![0.0, 1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0]
        );
    }
}
