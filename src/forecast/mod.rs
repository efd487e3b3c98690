//! Forecast strategy execution.
//!
//! - `executor`: one fuel, one model kind, one horizon
//! - `batch`: a manifest of fuels, in parallel, with per-fuel failure isolation

pub mod batch;
pub mod executor;

pub use batch::*;
pub use executor::*;
