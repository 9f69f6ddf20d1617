//! Pointwise ops
//!
//! Every op here has a diagonal Jacobian, so the forward pass records the
//! local derivative of each output element and the backward pass is a
//! single elementwise product with the upstream gradient.

use crate::autograd::tensor::GradCell;
use crate::autograd::{BackwardOp, Tensor};
use ndarray::Array1;
use std::rc::Rc;

/// Diagonal-Jacobian edge for one or two inputs
struct Pointwise {
    inputs: Vec<(Tensor, Array1<f32>)>,
    out: GradCell,
}

impl BackwardOp for Pointwise {
    fn backward(&self) {
        let Some(grad) = self.out.borrow().clone() else {
            return;
        };
        for (input, local) in &self.inputs {
            if input.requires_grad() {
                input.accumulate_grad(&grad * local);
            }
        }
    }

    fn inputs(&self) -> Vec<&Tensor> {
        self.inputs.iter().map(|(t, _)| t).collect()
    }
}

/// Build the output tensor and, when any input is tracked, its backward edge.
/// `locals` is evaluated lazily so untracked forward passes skip it.
fn pointwise<F>(data: Array1<f32>, operands: &[&Tensor], locals: F) -> Tensor
where
    F: FnOnce() -> Vec<Array1<f32>>,
{
    let tracked = operands.iter().any(|t| t.requires_grad());
    let mut out = Tensor::new(data, tracked);
    if tracked {
        let inputs = operands.iter().map(|t| (*t).clone()).zip(locals()).collect();
        out.set_backward_op(Rc::new(Pointwise { inputs, out: out.grad_cell() }));
    }
    out
}

fn same_len(op: &str, a: &Tensor, b: &Tensor) {
    assert_eq!(a.len(), b.len(), "{op}: operand lengths differ ({} vs {})", a.len(), b.len());
}

/// `a + b`
pub fn add(a: &Tensor, b: &Tensor) -> Tensor {
    same_len("add", a, b);
    let ones = || Array1::ones(a.len());
    pointwise(a.data() + b.data(), &[a, b], || vec![ones(), ones()])
}

/// `a ⊙ b`
pub fn mul(a: &Tensor, b: &Tensor) -> Tensor {
    same_len("mul", a, b);
    pointwise(a.data() * b.data(), &[a, b], || {
        vec![b.data().clone(), a.data().clone()]
    })
}

/// `factor · a`
pub fn scale(a: &Tensor, factor: f32) -> Tensor {
    pointwise(a.data() * factor, &[a], || vec![Array1::from_elem(a.len(), factor)])
}

/// `a + value`
pub fn add_scalar(a: &Tensor, value: f32) -> Tensor {
    pointwise(a.data() + value, &[a], || vec![Array1::ones(a.len())])
}

/// Rectifier; the kink at zero takes derivative 0
pub fn relu(a: &Tensor) -> Tensor {
    pointwise(a.data().mapv(|x| x.max(0.0)), &[a], || {
        vec![a.data().mapv(|x| f32::from(u8::from(x > 0.0)))]
    })
}

/// Logistic function
pub fn sigmoid(a: &Tensor) -> Tensor {
    let s = a.data().mapv(logistic);
    let local = s.mapv(|v| v * (1.0 - v));
    pointwise(s, &[a], || vec![local])
}

/// Hyperbolic tangent
pub fn tanh(a: &Tensor) -> Tensor {
    let t = a.data().mapv(f32::tanh);
    let local = t.mapv(|v| 1.0 - v * v);
    pointwise(t, &[a], || vec![local])
}

// Split on sign so exp never sees a large positive argument.
fn logistic(x: f32) -> f32 {
    if x >= 0.0 {
        (1.0 + (-x).exp()).recip()
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}
