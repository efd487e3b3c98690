//! Input/output helpers.
//!
//! - CSV/JSON ingest + validation (`ingest`)
//! - output tables and the run report (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
