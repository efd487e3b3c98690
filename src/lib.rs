//! `emission-forecast` library crate.
//!
//! The binary (`emf`) is a thin wrapper around this library so that:
//!
//! - forecasting, validation and aggregation are testable without spawning processes
//! - the pipeline stages can be driven from other front-ends with their own inputs
//!
//! Data flow: generation table -> `forecast` -> `emissions` -> `io` exports.
//! `validation` runs separately on history only.

pub mod app;
pub mod cli;
pub mod domain;
pub mod emissions;
pub mod error;
pub mod forecast;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
pub mod validation;
