//! Forecasting backends.
//!
//! - `naive`: repeat the last observation
//! - `linear`: OLS line over the history
//! - `trend`: piecewise-linear trend with penalized changepoints
//!
//! All three sit behind `ModelBackend`; `BackendSet::backend` is the only place
//! that maps a `ModelKind` to an implementation.

pub mod linear;
pub mod model;
pub mod naive;
pub mod trend;

pub use linear::*;
pub use model::*;
pub use naive::*;
pub use trend::*;
