//! Held-out backtesting of model kinds.

pub mod harness;
pub mod metrics;

pub use harness::*;
pub use metrics::*;
