//! Stochastic Gradient Descent optimizer

use super::Optimizer;
use crate::Tensor;
use ndarray::Array1;

/// SGD optimizer with optional momentum
pub struct SGD {
    lr: f32,
    momentum: f32,
    velocities: Vec<Option<Array1<f32>>>,
}

impl SGD {
    /// Create a new SGD optimizer
    pub fn new(lr: f32, momentum: f32) -> Self {
        Self { lr, momentum, velocities: Vec::new() }
    }

    /// Update one parameter in place, tracking its velocity in slot `i`
    fn update(&mut self, i: usize, param: &mut Tensor) {
        let Some(grad) = param.grad() else {
            return;
        };
        if self.velocities.len() <= i {
            self.velocities.resize(i + 1, None);
        }

        if self.momentum > 0.0 {
            // v = momentum * v - lr * grad
            let velocity = match &self.velocities[i] {
                Some(v) => v * self.momentum - &grad * self.lr,
                None => &grad * (-self.lr),
            };
            *param.data_mut() += &velocity;
            self.velocities[i] = Some(velocity);
        } else {
            // param -= lr * grad
            param.data_mut().scaled_add(-self.lr, &grad);
        }
    }
}

impl Optimizer for SGD {
    fn step(&mut self, params: &mut [&mut Tensor]) {
        for (i, param) in params.iter_mut().enumerate() {
            self.update(i, param);
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

    #[test]
    fn test_sgd_plain_step() {
        let mut opt = SGD::new(0.5, 0.0);
        let mut w = Tensor::from_vec(vec![1.0, -1.0], true);
        w.set_grad(arr1(&[2.0, -2.0]));
        opt.step(&mut [&mut w]);
        assert_eq!(w.data().to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_sgd_momentum_accumulates() {
        let mut opt = SGD::new(0.1, 0.9);
        let mut w = Tensor::from_vec(vec![0.0], true);

        w.set_grad(arr1(&[1.0]));
        opt.step(&mut [&mut w]);
        assert_abs_diff_eq!(w.data()[0], -0.1, epsilon = 1e-6);

        // v = 0.9 * -0.1 - 0.1 = -0.19
        opt.step(&mut [&mut w]);
        assert_abs_diff_eq!(w.data()[0], -0.29, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_velocity_is_per_position() {
        let mut opt = SGD::new(0.1, 0.5);
        let mut a = Tensor::from_vec(vec![1.0], true);
        let mut b = Tensor::from_vec(vec![2.0], true);
        b.set_grad(arr1(&[1.0]));

        opt.step(&mut [&mut a, &mut b]);
        assert_eq!(a.data()[0], 1.0);
        assert_abs_diff_eq!(b.data()[0], 1.9, epsilon = 1e-6);

        a.set_grad(arr1(&[1.0]));
        b.zero_grad();
        opt.step(&mut [&mut a, &mut b]);
        // a starts without velocity; b has none to apply without a gradient
        assert_abs_diff_eq!(a.data()[0], 0.9, epsilon = 1e-6);
        assert_abs_diff_eq!(b.data()[0], 1.9, epsilon = 1e-6);
    }

    #[test]
    fn test_sgd_converges_quadratic() {
        let mut opt = SGD::new(0.1, 0.0);
        let mut w = Tensor::from_vec(vec![3.0, -2.0, 1.5], true);
        for _ in 0..100 {
            w.set_grad(w.data().mapv(|x| 2.0 * x));
            opt.step(&mut [&mut w]);
        }
        assert!(w.data().iter().all(|v| v.abs() < 1e-3));
    }
}
