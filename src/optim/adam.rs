//! Adam optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// Adam optimizer
///
/// m_t = β1 · m_{t-1} + (1 − β1) · g
/// v_t = β2 · v_{t-1} + (1 − β2) · g²
/// θ_t = θ_{t-1} − lr_t · m_t / (√v_t + ε), with the bias-corrected
/// lr_t = lr · √(1 − β2^t) / (1 − β1^t)
pub struct Adam {
    lr: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    t: u64,
    m: Vec<Option<Array1<f32>>>, // First moment
    v: Vec<Option<Array1<f32>>>, // Second moment
}

impl Adam {
    /// Create a new Adam optimizer
    pub fn new(lr: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self { lr, beta1, beta2, epsilon, t: 0, m: Vec::new(), v: Vec::new() }
    }

    /// Create Adam with the usual defaults (β1 = 0.9, β2 = 0.999, ε = 1e-8)
    pub fn default_params(lr: f32) -> Self {
        Self::new(lr, 0.9, 0.999, 1e-8)
    }

    /// Number of steps taken so far
    #[must_use]
    pub fn step_count(&self) -> u64 {
        self.t
    }

    fn advance(&mut self, n_params: usize) -> f32 {
        if self.m.len() < n_params {
            self.m.resize(n_params, None);
            self.v.resize(n_params, None);
        }
        self.t += 1;

        self.lr
            * ((1.0 - self.beta2.powi(self.t as i32)).sqrt()
                / (1.0 - self.beta1.powi(self.t as i32)))
    }

    fn update(&mut self, i: usize, param: &mut Tensor, lr_t: f32) {
        let Some(grad) = param.grad() else {
            return;
        };

        let m_t = match &self.m[i] {
            Some(m) => m * self.beta1 + &grad * (1.0 - self.beta1),
            None => &grad * (1.0 - self.beta1),
        };

        let grad_sq = &grad * &grad;
        let v_t = match &self.v[i] {
            Some(v) => v * self.beta2 + &grad_sq * (1.0 - self.beta2),
            None => &grad_sq * (1.0 - self.beta2),
        };

        let update = &m_t / &(v_t.mapv(f32::sqrt) + self.epsilon) * lr_t;
        *param.data_mut() -= &update;

        self.m[i] = Some(m_t);
        self.v[i] = Some(v_t);
    }
}

impl Optimizer for Adam {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        let lr_t = self.advance(params.len());
        for (i, param) in params.iter_mut().enumerate() {
            self.update(i, param, lr_t);
        }
    }

    fn lr(&self) -> f32 {
        self.lr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr1;
    use proptest::prelude::*;

    #[test]
    fn test_adam_first_step_moves_by_lr() {
        // With bias correction the first update has magnitude ≈ lr whatever the gradient scale
        let mut opt = Adam::default_params(0.01);
        let mut w = Tensor::from_vec(vec![1.0, 1.0], true);
        w.set_grad(arr1(&[5.0, -0.1]));
        opt.step(&mut [&mut w]);

        assert_abs_diff_eq!(w.data()[0], 0.99, epsilon = 1e-4);
        assert_abs_diff_eq!(w.data()[1], 1.01, epsilon = 1e-4);
        assert_eq!(opt.step_count(), 1);
    }

    #[test]
    fn test_adam_counts_steps_not_parameters() {
        let mut opt = Adam::default_params(0.01);
        let mut a = Tensor::from_vec(vec![0.0], true);
        let mut b = Tensor::from_vec(vec![0.0, 0.0], true);
        for _ in 0..3 {
            a.set_grad(arr1(&[1.0]));
            b.set_grad(arr1(&[1.0, 1.0]));
            opt.step(&mut [&mut a, &mut b]);
        }
        assert_eq!(opt.step_count(), 3);
        assert_abs_diff_eq!(a.data()[0], b.data()[1], epsilon = 1e-7);
    }

    proptest! {
        #[test]
        fn prop_adam_converges_quadratic(lr in 0.05f32..0.5) {
            let mut optimizer = Adam::default_params(lr);
            let mut w = Tensor::from_vec(vec![3.0, -2.0, 1.5, -2.5], true);
            for _ in 0..100 {
                w.set_grad(w.data().mapv(|x| 2.0 * x));
                optimizer.step(&mut [&mut w]);
            }
            prop_assert!(w.data().iter().all(|&val| val.abs() < 1.5));
        }
    }
}
