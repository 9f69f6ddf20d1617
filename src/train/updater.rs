//! One optimizer update from one differentiable forward pass

use super::LossAccumulator;
use crate::autograd::backward;
use crate::error::{Error, Result};
use crate::gan::Parametrized;
use crate::optim::{clip_grad_norm, Optimizer};
use crate::Tensor;

/// Applies optimizer steps to one network and tracks its epoch-mean loss
///
/// Each network being trained gets its own updater so optimizer state
/// (moments, step counts) stays bound to that network's parameter order.
pub struct ParameterUpdater {
    optimizer: Box<dyn Optimizer>,
    max_grad_norm: Option<f32>,
    loss: LossAccumulator,
    steps: usize,
}

impl ParameterUpdater {
    pub fn new(optimizer: Box<dyn Optimizer>, max_grad_norm: Option<f32>) -> Self {
        Self { optimizer, max_grad_norm, loss: LossAccumulator::new(), steps: 0 }
    }

    /// Perform a single update
    ///
    /// Clears the model's gradients, runs `forward_fn` to build a scalar
    /// loss, backpropagates it, clips by global norm when configured, steps
    /// the optimizer, and folds the loss into the running mean.
    ///
    /// A non-finite loss is refused with [`Error::NonFiniteLoss`] before any
    /// parameter changes; errors from `forward_fn` are returned unchanged and
    /// also leave the parameters untouched.
    pub fn step<M, F>(&mut self, model: &mut M, forward_fn: F) -> Result<f32>
    where
        M: Parametrized + ?Sized,
        F: FnOnce(&M) -> Result<Tensor>,
    {
        self.optimizer.zero_grad(&mut model.parameters_mut());

        let mut loss = forward_fn(&*model)?;
        let value = loss.item();
        if !value.is_finite() {
            return Err(Error::NonFiniteLoss(value));
        }

        backward(&mut loss, None);
        drop(loss);

        let mut params = model.parameters_mut();
        if let Some(max_norm) = self.max_grad_norm {
            let norm = clip_grad_norm(&mut params, max_norm);
            tracing::trace!(norm, max_norm, "gradient norm");
        }
        self.optimizer.step(&mut params);

        self.loss.update(value);
        self.steps += 1;
        Ok(value)
    }

    /// Start a new epoch's running mean
    pub fn reset_epoch(&mut self) {
        self.loss.reset();
    }

    pub fn loss(&self) -> &LossAccumulator {
        &self.loss
    }

    /// Mean loss of the current epoch
    pub fn epoch_loss(&self) -> f32 {
        self.loss.mean()
    }

    /// Updates applied over the updater's lifetime
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn lr(&self) -> f32 {
        self.optimizer.lr()
    }
}
