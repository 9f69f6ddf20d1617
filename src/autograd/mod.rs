//! Tape-based autograd engine
//!
//! Provides reverse-mode automatic differentiation over flat `f32` tensors.
//! Every differentiable op records a [`BackwardOp`] on its output; calling
//! [`backward`] on a scalar loss walks the recorded graph in reverse
//! topological order, so each node propagates its gradient exactly once even
//! when it feeds several consumers (recurrent hidden states, shared weights).
//!
//! ```
//! use maligan::autograd::{backward, matmul, sum, Tensor};
//!
//! let w = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], true);
//! let x = Tensor::from_vec(vec![1.0, 1.0], false);
//! let mut loss = sum(&matmul(&x, &w, 1, 2, 2));
//! backward(&mut loss, None);
//! assert_eq!(w.grad().unwrap().to_vec(), vec![1.0, 1.0, 1.0, 1.0]);
//! ```

mod backward;
mod ops;
mod tensor;

#[cfg(test)]
mod tests;

pub use backward::BackwardOp;
pub use ops::*;
pub use tensor::Tensor;

use std::collections::HashSet;
use std::rc::Rc;

/// Perform backward pass on a tensor
///
/// Seeds `tensor` with `grad_output` (ones when `None`, the usual choice for a
/// scalar loss) and propagates through every recorded op reachable from it.
pub fn backward(tensor: &mut Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    let grad = grad_output.unwrap_or_else(|| ndarray::Array1::ones(tensor.len()));
    tensor.set_grad(grad);

    for op in topological_order(tensor).iter().rev() {
        op.backward();
    }
}

/// Post-order of the ops reachable from `root` (inputs before consumers)
fn topological_order(root: &Tensor) -> Vec<Rc<dyn BackwardOp>> {
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    let mut stack: Vec<(Rc<dyn BackwardOp>, usize, bool)> = Vec::new();

    if let Some(op) = root.backward_op() {
        stack.push((op, root.node_id(), false));
    }

    while let Some((op, id, expanded)) = stack.pop() {
        if expanded {
            order.push(op);
            continue;
        }
        if !visited.insert(id) {
            continue;
        }

        stack.push((Rc::clone(&op), id, true));
        for input in op.inputs() {
            if let Some(child) = input.backward_op() {
                let child_id = input.node_id();
                if !visited.contains(&child_id) {
                    stack.push((child, child_id, false));
                }
            }
        }
    }

    order
}
