//! Random weight initialization

use crate::Tensor;
use rand::Rng;

/// One standard-normal draw scaled by `std` (Box-Muller)
fn sample_normal<R: Rng + ?Sized>(rng: &mut R, std: f64) -> f32 {
    let u1: f64 = rng.random::<f64>().max(1e-10);
    let u2: f64 = rng.random::<f64>();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    (z * std) as f32
}

/// Xavier-normal `fan_in × fan_out` weight matrix, trainable
pub(crate) fn xavier<R: Rng + ?Sized>(fan_in: usize, fan_out: usize, rng: &mut R) -> Tensor {
    let std = (2.0 / (fan_in + fan_out) as f64).sqrt();
    normal(fan_in * fan_out, std, rng)
}

/// Trainable tensor of `len` normal draws with standard deviation `std`
pub(crate) fn normal<R: Rng + ?Sized>(len: usize, std: f64, rng: &mut R) -> Tensor {
    let data = (0..len).map(|_| sample_normal(rng, std)).collect();
    Tensor::from_vec(data, true)
}

/// Trainable tensor filled with `value`
pub(crate) fn constant(len: usize, value: f32) -> Tensor {
    Tensor::from_vec(vec![value; len], true)
}
