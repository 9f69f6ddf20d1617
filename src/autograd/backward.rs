//! Backward operation trait

use super::Tensor;

/// A recorded differentiable operation
///
/// Implementations read the gradient of the op's output (held in the output
/// tensor's gradient cell) and add their contribution to each input's
/// gradient. They must not recurse into the inputs' own ops: ordering is the
/// job of [`crate::autograd::backward`].
pub trait BackwardOp {
    /// Accumulate the output gradient into the inputs' gradients
    fn backward(&self);

    /// Tensors this op read during the forward pass
    fn inputs(&self) -> Vec<&Tensor>;
}
