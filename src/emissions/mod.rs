//! Emission aggregation.
//!
//! - `units`: conversion constants between factor, generation and intensity units
//! - `factors`: the immutable emission factor table
//! - `aggregator`: per-fuel detail rows, yearly totals, intensity, renewable share

pub mod aggregator;
pub mod factors;
pub mod units;

pub use aggregator::*;
pub use factors::*;
pub use units::*;
