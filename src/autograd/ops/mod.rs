//! Autograd operations with backward passes
//!
//! Matrices are stored row-major in flat tensors; ops that need a 2-D view
//! take the dimensions explicitly.

mod dropout;
mod elementwise;
mod embedding;
mod loss;
mod matmul;
mod reduce;
mod shape;

pub use dropout::dropout;
pub use elementwise::{add, add_scalar, mul, relu, scale, sigmoid, tanh};
pub use embedding::embedding;
pub use loss::{log_softmax_rows, sparse_cross_entropy};
pub use matmul::matmul;
pub use reduce::{add_row_broadcast, sum};
pub use shape::{concat_columns, max_pool_groups};
