//! Single-step parameter updates
//!
//! This module provides the pieces every phase of adversarial training
//! shares:
//! - [`LossAccumulator`]: running mean of step losses within one epoch
//! - [`ParameterUpdater`]: zero grads → forward → backward → clip → optimizer step
//! - the three losses the phases optimize: next-token cross-entropy, its
//!   reward-weighted policy-gradient form, and real/fake classification
//!
//! # Example
//!
//! ```
//! use maligan::gan::Parametrized;
//! use maligan::optim::SGD;
//! use maligan::train::ParameterUpdater;
//! use maligan::autograd::{mul, sum};
//! use maligan::Tensor;
//!
//! struct Line {
//!     w: Tensor,
//! }
//!
//! impl Parametrized for Line {
//!     fn named_parameters(&self) -> Vec<(String, &Tensor)> {
//!         vec![("w".into(), &self.w)]
//!     }
//!     fn named_parameters_mut(&mut self) -> Vec<(String, &mut Tensor)> {
//!         vec![("w".into(), &mut self.w)]
//!     }
//! }
//!
//! let mut model = Line { w: Tensor::from_vec(vec![2.0], true) };
//! let mut updater = ParameterUpdater::new(Box::new(SGD::new(0.1, 0.0)), None);
//!
//! // loss = w², gradient 2w = 4, so w moves to 2 - 0.1 * 4
//! let loss = updater.step(&mut model, |m| Ok(sum(&mul(&m.w, &m.w))))?;
//! assert_eq!(loss, 4.0);
//! assert!((model.w.data()[0] - 1.6).abs() < 1e-6);
//! # Ok::<(), maligan::Error>(())
//! ```

mod accumulator;
mod loss;
mod updater;


pub use accumulator::LossAccumulator;
pub use loss::{classification_loss, next_token_loss};
pub use updater::ParameterUpdater;
