//! Gradient clipping

use crate::Tensor;

/// Rescale a parameter set's gradients so their global L2 norm is at most
/// `max_norm`
///
/// The norm is taken over every gradient in the set at once; parameters
/// without a gradient contribute nothing. Returns the norm before clipping.
pub fn clip_grad_norm(params: &mut [&mut Tensor], max_norm: f32) -> f32 {
    let norm = params
        .iter()
        .filter_map(|p| p.grad())
        .map(|g| g.dot(&g))
        .sum::<f32>()
        .sqrt();

    if norm > max_norm {
        let factor = max_norm / norm;
        for param in params.iter_mut() {
            if let Some(grad) = param.grad() {
                param.set_grad(grad * factor);
            }
        }
    }

    norm
}
