//! Mathematical utilities: least squares solvers and the trend basis.

pub mod basis;
pub mod ols;

pub use basis::*;
pub use ols::*;
