//! Optimizer trait

use crate::Tensor;

/// Applies one update to a parameter set lent by a network
///
/// Parameters arrive as the `&mut Tensor`s returned by
/// [`crate::gan::Parametrized::parameters_mut`]. Per-parameter state
/// (moments, velocities) is keyed by position, so a network must list its
/// parameters in the same order on every call. Parameters without a gradient
/// are left untouched.
pub trait Optimizer {
    fn step(&mut self, params: &mut [&mut Tensor]);

    /// Clear the gradients of every parameter in the set
    fn zero_grad(&mut self, params: &mut [&mut Tensor]) {
        for param in params.iter_mut() {
            param.zero_grad();
        }
    }

    fn lr(&self) -> f32;
}
