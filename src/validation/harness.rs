//! Backtesting harness.
//!
//! Each series is split at a cutoff year. Every allowed model kind is fitted on
//! the training part (`year <= cutoff`) only, evaluated at the held-out years and
//! scored with RMSE and MAPE. Predictions are clipped at zero first, matching
//! what the production forecast would have reported.
//!
//! The harness is diagnostic. It never touches production forecasts; the
//! per-source recommendation it produces is for whoever maintains the
//! model assignment.

use rayon::prelude::*;
use serde::Serialize;

use crate::domain::{
    AllowList, GenerationTable, Measure, ModelKind, SourceFailure, SourceSeries, ValidationRecord,
};
use crate::error::ForecastError;
use crate::models::BackendSet;
use crate::validation::metrics::{mape, rmse};

/// Scores and failures for one or more sources.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    /// One record per (source, evaluated kind), in manifest then allow-list order.
    pub records: Vec<ValidationRecord>,
    pub failures: Vec<SourceFailure>,
}

impl ValidationReport {
    /// Lowest-RMSE model per source, in record order. Ties go to the kind listed first.
    pub fn best_by_source(&self) -> Vec<(&str, ModelKind)> {
        let mut out: Vec<(&str, &ValidationRecord)> = Vec::new();
        for record in &self.records {
            match out.iter_mut().find(|(source, _)| *source == record.source) {
                Some(entry) => {
                    if record.rmse < entry.1.rmse {
                        entry.1 = record;
                    }
                }
                None => out.push((record.source.as_str(), record)),
            }
        }
        out.into_iter().map(|(s, r)| (s, r.model)).collect()
    }

    fn extend(&mut self, other: ValidationReport) {
        self.records.extend(other.records);
        self.failures.extend(other.failures);
    }
}

/// Backtest `kinds` on one series.
///
/// Returns `Err` when the split itself is unusable (no validation or no
/// training years). A kind that cannot be fitted on the training part is
/// recorded in the report's `failures` and the other kinds still run.
pub fn validate_source(
    series: &SourceSeries,
    cutoff_year: i32,
    kinds: &[ModelKind],
    backends: &BackendSet,
) -> Result<ValidationReport, ForecastError> {
    let fuel = series.fuel();
    let (train, holdout) = series.split_at(cutoff_year);
    if holdout.is_empty() {
        return Err(ForecastError::EmptyValidationSet {
            fuel: fuel.to_string(),
            cutoff: cutoff_year,
        });
    }
    if train.is_empty() {
        return Err(ForecastError::InsufficientData {
            fuel: fuel.to_string(),
            model: kinds.first().copied().unwrap_or(ModelKind::Naive),
            required: 1,
            available: 0,
        });
    }

    let actual: Vec<f64> = holdout.iter().map(|o| o.value).collect();
    let mut report = ValidationReport::default();

    for &kind in kinds {
        let fitted = match backends.backend(kind).fit(fuel, train) {
            Ok(fitted) => fitted,
            Err(err) => {
                tracing::warn!(fuel, model = %kind, error = %err, "validation fit failed");
                report.failures.push(SourceFailure::new(fuel, Some(kind), &err));
                continue;
            }
        };
        let predicted: Vec<f64> = holdout
            .iter()
            .map(|o| fitted.predict(o.year).max(0.0))
            .collect();

        let rmse = rmse(&actual, &predicted)?;
        let mape = match mape(&actual, &predicted) {
            Ok(v) => Measure::Value(v),
            Err(err @ ForecastError::UndefinedMetric { .. }) => {
                tracing::warn!(fuel, model = %kind, error = %err, "MAPE undefined");
                Measure::Undefined
            }
            Err(err) => return Err(err),
        };
        tracing::debug!(fuel, model = %kind, rmse, mape = %mape, "validation scored");

        report.records.push(ValidationRecord {
            source: fuel.to_string(),
            model: kind,
            rmse,
            mape,
        });
    }

    Ok(report)
}

/// Backtest every fuel in `manifest` using the kinds `allow_list` permits.
pub fn run_validation(
    table: &GenerationTable,
    manifest: &[String],
    allow_list: &AllowList,
    cutoff_year: i32,
    backends: &BackendSet,
) -> ValidationReport {
    let outcomes: Vec<(&str, Result<ValidationReport, ForecastError>)> = manifest
        .par_iter()
        .map(|fuel| {
            let outcome = table.series(fuel).and_then(|series| {
                validate_source(&series, cutoff_year, allow_list.kinds_for(fuel), backends)
            });
            (fuel.as_str(), outcome)
        })
        .collect();

    let mut report = ValidationReport::default();
    for (fuel, outcome) in outcomes {
        match outcome {
            Ok(source_report) => {
                tracing::info!(
                    fuel,
                    scored = source_report.records.len(),
                    failed = source_report.failures.len(),
                    "validation complete"
                );
                report.extend(source_report);
            }
            Err(err) => {
                tracing::warn!(fuel, error = %err, "validation failed");
                report.failures.push(SourceFailure::new(fuel, None, &err));
            }
        }
    }
    report
}
