//! Forecast every fuel in a manifest.
//!
//! Fuels are independent, so they are fitted in parallel. A failing fuel is
//! logged and recorded in `failures`; it never stops the others.

use rayon::prelude::*;

use crate::domain::{ForecastResult, GenerationTable, ModelAssignment, ModelKind, SourceFailure};
use crate::error::ForecastError;
use crate::forecast::executor::forecast_source;
use crate::models::BackendSet;

/// Output of a batch forecast.
#[derive(Debug, Clone, Default)]
pub struct ForecastRun {
    /// One result per successful fuel, in manifest order.
    pub results: Vec<ForecastResult>,
    pub failures: Vec<SourceFailure>,
}

/// Forecast each fuel of `manifest` through `horizon_year`.
pub fn run_forecasts(
    table: &GenerationTable,
    manifest: &[String],
    assignment: &ModelAssignment,
    horizon_year: i32,
    backends: &BackendSet,
) -> ForecastRun {
    let outcomes: Vec<(&str, Option<ModelKind>, Result<ForecastResult, ForecastError>)> = manifest
        .par_iter()
        .map(|fuel| {
            let kind = match assignment.get(fuel) {
                Ok(kind) => kind,
                Err(e) => return (fuel.as_str(), None, Err(e)),
            };
            let outcome = table
                .series(fuel)
                .and_then(|series| forecast_source(&series, kind, horizon_year, backends));
            (fuel.as_str(), Some(kind), outcome)
        })
        .collect();

    let mut run = ForecastRun::default();
    for (fuel, kind, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                tracing::info!(
                    fuel,
                    model = %result.model(),
                    first_year = result.first_year(),
                    last_year = result.last_year(),
                    "forecast complete"
                );
                run.results.push(result);
            }
            Err(err) => {
                tracing::warn!(fuel, error = %err, "forecast failed");
                run.failures.push(SourceFailure::new(fuel, kind, &err));
            }
        }
    }
    run
}
