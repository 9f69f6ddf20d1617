//! Inverted dropout

use crate::autograd::{mul, Tensor};
use rand::Rng;

/// Zero each element with probability `rate`, scaling survivors by `1/(1-rate)`
///
/// Expected activations are unchanged, so inference simply skips this op.
/// The mask is a constant of the graph; gradients flow through `mul`.
pub fn dropout<R: Rng + ?Sized>(a: &Tensor, rate: f32, rng: &mut R) -> Tensor {
    assert!((0.0..1.0).contains(&rate), "dropout: rate must be in [0, 1)");
    if rate == 0.0 {
        return a.clone();
    }

    let keep = 1.0 - rate;
    let mask: Vec<f32> = (0..a.len())
        .map(|_| if rng.random::<f32>() < keep { 1.0 / keep } else { 0.0 })
        .collect();

    mul(a, &Tensor::from_vec(mask, false))
}
