//! Dense matrix product on row-major flat tensors

use crate::autograd::tensor::GradCell;
use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// `(m×k)·(k×n)` where `lhs` and `rhs` are row-major, `rhs` optionally read
/// as its transpose
fn product(
    lhs: &Array1<f32>,
    rhs: &Array1<f32>,
    (m, k, n): (usize, usize, usize),
    rhs_t: bool,
) -> Array1<f32> {
    let mut out = Array1::zeros(m * n);
    for i in 0..m {
        for p in 0..k {
            let l = lhs[i * k + p];
            if l == 0.0 {
                continue;
            }
            for j in 0..n {
                let r = if rhs_t { rhs[j * k + p] } else { rhs[p * n + j] };
                out[i * n + j] += l * r;
            }
        }
    }
    out
}

/// `a (m×k) · b (k×n)`
///
/// Used for every dense layer: embedding windows against convolution
/// filters, LSTM inputs and hidden state against gate weights, features
/// against output projections.
///
/// # Panics
///
/// If `a` or `b` does not hold exactly `m·k` or `k·n` values.
pub fn matmul(a: &Tensor, b: &Tensor, m: usize, k: usize, n: usize) -> Tensor {
    assert_eq!(a.len(), m * k, "Matrix A size mismatch");
    assert_eq!(b.len(), k * n, "Matrix B size mismatch");

    let requires_grad = a.requires_grad() || b.requires_grad();
    let mut result = Tensor::new(product(a.data(), b.data(), (m, k, n), false), requires_grad);

    if requires_grad {
        let backward_op = Rc::new(MatmulBackward {
            a: a.clone(),
            b: b.clone(),
            m,
            k,
            n,
            result_grad: result.grad_cell(),
        });
        result.set_backward_op(backward_op);
    }

    result
}

struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
    result_grad: GradCell,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self) {
        let Some(grad) = self.result_grad.borrow().clone() else {
            return;
        };
        let (m, k, n) = (self.m, self.k, self.n);

        // dA = dC · Bᵀ
        if self.a.requires_grad() {
            self.a.accumulate_grad(product(&grad, self.b.data(), (m, n, k), true));
        }

        // dB[p, j] = Σ_i A[i, p] · dC[i, j]
        if self.b.requires_grad() {
            let a = self.a.data();
            let mut grad_b = Array1::zeros(k * n);
            for i in 0..m {
                for p in 0..k {
                    let a_ip = a[i * k + p];
                    for j in 0..n {
                        grad_b[p * n + j] += a_ip * grad[i * n + j];
                    }
                }
            }
            self.b.accumulate_grad(grad_b);
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        vec![&self.a, &self.b]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autograd::{backward, sum};

    #[test]
    fn test_matmul_2x2() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], false);
        let b = Tensor::from_vec(vec![5.0, 6.0, 7.0, 8.0], false);
        assert_eq!(matmul(&a, &b, 2, 2, 2).data().to_vec(), vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matmul_row_vector_gradients() {
        // x (1×3) · W (3×2): dW[p, j] = x[p], dx[p] = Σ_j W[p, j]
        let x = Tensor::from_vec(vec![1.0, 2.0, 3.0], true);
        let w = Tensor::from_vec(vec![1.0, -1.0, 0.5, 0.5, 2.0, 0.0], true);
        let mut loss = sum(&matmul(&x, &w, 1, 3, 2));
        backward(&mut loss, None);

        assert_eq!(w.grad().unwrap().to_vec(), vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        assert_eq!(x.grad().unwrap().to_vec(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    #[should_panic(expected = "Matrix A size mismatch")]
    fn test_matmul_size_mismatch() {
        let a = Tensor::from_vec(vec![1.0, 2.0, 3.0], false);
        let b = Tensor::from_vec(vec![1.0, 2.0], false);
        matmul(&a, &b, 2, 2, 1);
    }
}
