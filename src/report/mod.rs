//! Run reporting: the end-of-run JSON report and terminal formatting.

pub mod format;

pub use format::*;

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::SourceFailure;

/// What a run produced and what it could not.
///
/// Written as `run_report.json` next to the output tables.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub horizon_year: i32,
    pub forecast_fuels: Vec<String>,
    pub failures: Vec<SourceFailure>,
    pub unmapped_fuels: Vec<String>,
    pub outputs: Vec<PathBuf>,
}
