//! Shared domain types.
//!
//! These types are intentionally kept small and serializable so they can be:
//!
//! - passed read-only through the forecasting and aggregation stages
//! - exported to CSV/JSON for the presentation layer
//! - constructed directly in tests

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::config::normalize_fuel_name;
use crate::error::ForecastError;

/// A single annual observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    pub value: f64,
}

impl Observation {
    pub fn new(year: i32, value: f64) -> Self {
        Self { year, value }
    }
}

/// Historical generation for one fuel.
///
/// Invariants (checked by [`SourceSeries::new`]):
/// - at least one point
/// - years strictly increasing
/// - values finite and non-negative
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSeries {
    fuel: String,
    points: Vec<Observation>,
}

impl SourceSeries {
    pub fn new(fuel: impl Into<String>, points: Vec<Observation>) -> Result<Self, ForecastError> {
        let fuel = fuel.into();
        if points.is_empty() {
            return Err(ForecastError::InvalidInput(format!(
                "Series '{fuel}' has no observations."
            )));
        }
        for pair in points.windows(2) {
            if pair[1].year <= pair[0].year {
                return Err(ForecastError::InvalidInput(format!(
                    "Series '{fuel}' years must be strictly increasing ({} then {}).",
                    pair[0].year, pair[1].year
                )));
            }
        }
        if let Some(bad) = points.iter().find(|p| !(p.value.is_finite() && p.value >= 0.0)) {
            return Err(ForecastError::InvalidInput(format!(
                "Series '{fuel}' has an invalid value {} in {}.",
                bad.value, bad.year
            )));
        }
        Ok(Self { fuel, points })
    }

    /// Convenience constructor from parallel year/value slices.
    pub fn from_pairs(fuel: impl Into<String>, pairs: &[(i32, f64)]) -> Result<Self, ForecastError> {
        let points = pairs.iter().map(|&(year, value)| Observation::new(year, value)).collect();
        Self::new(fuel, points)
    }

    pub fn fuel(&self) -> &str {
        &self.fuel
    }

    pub fn points(&self) -> &[Observation] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_year(&self) -> i32 {
        self.points[0].year
    }

    pub fn last(&self) -> Observation {
        self.points[self.points.len() - 1]
    }

    /// Partition at `cutoff`: training is `year <= cutoff`, validation is `year > cutoff`.
    pub fn split_at(&self, cutoff: i32) -> (&[Observation], &[Observation]) {
        let idx = self.points.partition_point(|p| p.year <= cutoff);
        self.points.split_at(idx)
    }
}

/// Forecasting model kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Repeat the last observed value.
    Naive,
    /// Ordinary least squares line through the whole history.
    Linear,
    /// Piecewise-linear trend with changepoints.
    #[serde(alias = "prophet")]
    Trend,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Naive, ModelKind::Linear, ModelKind::Trend];

    /// Human-readable label for terminal output and CSV reports.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Naive => "Naive",
            ModelKind::Linear => "Linear",
            ModelKind::Trend => "Trend",
        }
    }

    /// Smallest history the backend can be fitted on.
    pub fn min_points(self) -> usize {
        match self {
            ModelKind::Naive => 1,
            ModelKind::Linear | ModelKind::Trend => 2,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Fuel -> model kind. An unmapped fuel is an error, never a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelAssignment(BTreeMap<String, ModelKind>);

impl ModelAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, fuel: impl Into<String>, kind: ModelKind) -> Self {
        self.0.insert(fuel.into(), kind);
        self
    }

    pub fn insert(&mut self, fuel: impl Into<String>, kind: ModelKind) {
        self.0.insert(fuel.into(), kind);
    }

    pub fn get(&self, fuel: &str) -> Result<ModelKind, ForecastError> {
        self.0
            .get(fuel)
            .copied()
            .ok_or_else(|| ForecastError::UnknownModelKind(fuel.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ModelKind)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Rebuild the map with canonical fuel keys.
    ///
    /// Keys that collide keep the kind of the last one in key order.
    pub fn normalize_keys(&mut self) {
        self.0 = std::mem::take(&mut self.0)
            .into_iter()
            .map(|(fuel, kind)| (normalize_fuel_name(&fuel), kind))
            .collect();
    }
}

/// One forecast point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub year: i32,
    pub value: f64,
}

/// History plus projection for one fuel.
///
/// Values are non-negative and years are contiguous and strictly increasing.
/// Fields are private so a result cannot be edited after the executor built it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    fuel: String,
    model: ModelKind,
    last_observed_year: i32,
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Build a result, enforcing the output invariants.
    ///
    /// Points are sorted by year; duplicate or missing years and negative or
    /// non-finite values are rejected.
    pub fn new(
        fuel: impl Into<String>,
        model: ModelKind,
        last_observed_year: i32,
        mut points: Vec<ForecastPoint>,
    ) -> Result<Self, ForecastError> {
        let fuel = fuel.into();
        if points.is_empty() {
            return Err(ForecastError::InvalidInput(format!("Forecast for '{fuel}' is empty.")));
        }
        points.sort_by_key(|p| p.year);
        for pair in points.windows(2) {
            if pair[1].year != pair[0].year + 1 {
                return Err(ForecastError::InvalidInput(format!(
                    "Forecast for '{fuel}' is not contiguous ({} then {}).",
                    pair[0].year, pair[1].year
                )));
            }
        }
        if let Some(bad) = points.iter().find(|p| !(p.value.is_finite() && p.value >= 0.0)) {
            return Err(ForecastError::Numeric(format!(
                "Invalid forecast value {} for '{fuel}' in {}.",
                bad.value, bad.year
            )));
        }
        Ok(Self {
            fuel,
            model,
            last_observed_year,
            points,
        })
    }

    pub fn fuel(&self) -> &str {
        &self.fuel
    }

    pub fn model(&self) -> ModelKind {
        self.model
    }

    pub fn last_observed_year(&self) -> i32 {
        self.last_observed_year
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    pub fn first_year(&self) -> i32 {
        self.points[0].year
    }

    pub fn last_year(&self) -> i32 {
        self.points[self.points.len() - 1].year
    }

    /// Projected points only (years after the last observation).
    pub fn future(&self) -> &[ForecastPoint] {
        let idx = self.points.partition_point(|p| p.year <= self.last_observed_year);
        &self.points[idx..]
    }

    pub fn value_at(&self, year: i32) -> Option<f64> {
        let idx = year.checked_sub(self.first_year())?;
        self.points.get(usize::try_from(idx).ok()?).map(|p| p.value)
    }
}

/// A ratio-like figure that may be undefined (zero denominator, zero actuals).
///
/// Kept distinct from `0.0` so an undefined reading is never mistaken for a real one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "Option<f64>")]
pub enum Measure {
    Value(f64),
    Undefined,
}

impl Measure {
    /// `numerator / denominator`, undefined when the denominator is not strictly positive.
    pub fn ratio(numerator: f64, denominator: f64) -> Measure {
        if denominator > 0.0 && numerator.is_finite() && denominator.is_finite() {
            Measure::Value(numerator / denominator)
        } else {
            Measure::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Measure::Value(v) => Some(v),
            Measure::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Measure::Value(_))
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Measure {
        match self {
            Measure::Value(v) => Measure::Value(f(v)),
            Measure::Undefined => Measure::Undefined,
        }
    }
}

impl From<Measure> for Option<f64> {
    fn from(m: Measure) -> Self {
        m.value()
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Value(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
            Measure::Undefined => f.write_str("undefined"),
        }
    }
}

/// Per-fuel-per-year generation and emission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmissionDetailRow {
    pub year: i32,
    pub fuel: String,
    pub generation_twh: f64,
    pub emission_mtco2: f64,
}

/// Yearly totals across all fuels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlySummary {
    pub year: i32,
    pub total_generation_twh: f64,
    pub total_emission_mtco2: f64,
    /// kgCO2/MWh; undefined when total generation is zero.
    pub emission_intensity_kgco2_per_mwh: Measure,
}

/// Renewable share of total generation for one year, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenewableShare {
    pub year: i32,
    pub share_pct: Measure,
}

/// Backtest score for one (source, model) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationRecord {
    pub source: String,
    pub model: ModelKind,
    pub rmse: f64,
    /// Fraction (not percent); undefined when an actual value is zero.
    pub mape: Measure,
}

/// A fuel (and optionally a model) that failed during a batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFailure {
    pub fuel: String,
    pub model: Option<ModelKind>,
    pub reason: String,
}

impl SourceFailure {
    pub fn new(fuel: impl Into<String>, model: Option<ModelKind>, err: &ForecastError) -> Self {
        Self {
            fuel: fuel.into(),
            model,
            reason: err.to_string(),
        }
    }
}

/// Wide historical generation table: one row per year, one column per fuel.
///
/// Missing cells are `None` and simply drop out of that fuel's series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationTable {
    years: Vec<i32>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl GenerationTable {
    pub fn new(years: Vec<i32>, columns: BTreeMap<String, Vec<Option<f64>>>) -> Result<Self, ForecastError> {
        for (fuel, values) in &columns {
            if values.len() != years.len() {
                return Err(ForecastError::InvalidInput(format!(
                    "Column '{fuel}' has {} values for {} years.",
                    values.len(),
                    years.len()
                )));
            }
        }
        Ok(Self { years, columns })
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn fuels(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Extract and validate one fuel's series (rows sorted by year, missing cells dropped).
    pub fn series(&self, fuel: &str) -> Result<SourceSeries, ForecastError> {
        let column = self
            .columns
            .get(fuel)
            .ok_or_else(|| ForecastError::UnknownSource(fuel.to_string()))?;
        let mut points: Vec<Observation> = self
            .years
            .iter()
            .zip(column)
            .filter_map(|(&year, v)| v.map(|value| Observation::new(year, value)))
            .collect();
        points.sort_by_key(|p| p.year);
        SourceSeries::new(fuel, points)
    }
}
