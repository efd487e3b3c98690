//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input series (`SourceSeries`, `GenerationTable`)
//! - model selection (`ModelKind`, `ModelAssignment`)
//! - outputs (`ForecastResult`, `YearlySummary`, `ValidationRecord`, ...)
//! - run configuration (`PipelineConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
