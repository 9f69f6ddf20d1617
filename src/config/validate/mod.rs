//! Configuration validation
//!
//! Validates training specifications for correctness before execution.

mod error;
mod validator;

#[cfg(test)]
mod tests;

pub use error::ValidationError;
pub use validator::validate_config;
