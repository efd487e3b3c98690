//! Run configuration.
//!
//! Built from CLI flags, optionally layered over a JSON file. The defaults mirror
//! the production setup: eight fuels, a 2035 horizon and a 2015 validation cutoff.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{ModelAssignment, ModelKind};
use crate::error::ForecastError;

pub const DEFAULT_HORIZON_YEAR: i32 = 2035;
pub const DEFAULT_CUTOFF_YEAR: i32 = 2015;

pub const DEFAULT_FUELS: [&str; 8] = [
    "coal", "solar", "wind", "hydro", "nuclear", "oil", "gas", "bioenergy",
];

pub const DEFAULT_RENEWABLES: [&str; 4] = ["solar", "wind", "hydro", "bioenergy"];

/// Canonical fuel key: trimmed, lowercased, inner spaces as `_`.
///
/// Generation headers, config keys and factor rows all go through this so
/// `"Natural Gas"` and `"natural_gas"` name the same fuel.
pub fn normalize_fuel_name(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace(' ', "_")
}

/// Parameters of the changepoint trend backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Flexibility of the trend (higher bends more readily toward recent data).
    pub changepoint_prior_scale: f64,
    /// Maximum number of candidate changepoints.
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    /// Reweighting iteration budget.
    pub max_iterations: usize,
    /// Convergence tolerance on the largest coefficient update (scaled units).
    pub tolerance: f64,
    /// Minimum history length; never below 2.
    pub min_points: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            changepoint_prior_scale: 0.2,
            n_changepoints: 25,
            changepoint_range: 0.8,
            max_iterations: 1000,
            tolerance: 1e-7,
            min_points: 3,
        }
    }
}

impl TrendConfig {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if !(self.changepoint_prior_scale.is_finite() && self.changepoint_prior_scale > 0.0) {
            return Err(ForecastError::InvalidInput(format!(
                "changepoint_prior_scale must be finite and > 0, got {}.",
                self.changepoint_prior_scale
            )));
        }
        if !(self.changepoint_range > 0.0 && self.changepoint_range <= 1.0) {
            return Err(ForecastError::InvalidInput(format!(
                "changepoint_range must be in (0, 1], got {}.",
                self.changepoint_range
            )));
        }
        if self.max_iterations == 0 {
            return Err(ForecastError::InvalidInput("max_iterations must be >= 1.".to_string()));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ForecastError::InvalidInput("tolerance must be finite and > 0.".to_string()));
        }
        Ok(())
    }
}

/// Which model kinds the validation harness evaluates for each fuel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowList {
    /// Kinds evaluated for any fuel without an override.
    pub default: Vec<ModelKind>,
    /// Per-fuel replacement of `default`.
    #[serde(default)]
    pub overrides: BTreeMap<String, Vec<ModelKind>>,
}

impl AllowList {
    pub fn uniform(kinds: Vec<ModelKind>) -> Self {
        Self {
            default: kinds,
            overrides: BTreeMap::new(),
        }
    }

    pub fn with_override(mut self, fuel: impl Into<String>, kinds: Vec<ModelKind>) -> Self {
        self.overrides.insert(fuel.into(), kinds);
        self
    }

    pub fn kinds_for(&self, fuel: &str) -> &[ModelKind] {
        self.overrides.get(fuel).unwrap_or(&self.default)
    }

    fn normalize_keys(&mut self) {
        self.overrides = std::mem::take(&mut self.overrides)
            .into_iter()
            .map(|(fuel, kinds)| (normalize_fuel_name(&fuel), kinds))
            .collect();
    }
}

impl Default for AllowList {
    /// Naive and Linear everywhere; Trend only for the fuels with long, varied history.
    fn default() -> Self {
        let all = vec![ModelKind::Naive, ModelKind::Linear, ModelKind::Trend];
        AllowList::uniform(vec![ModelKind::Naive, ModelKind::Linear])
            .with_override("coal", all.clone())
            .with_override("solar", all.clone())
            .with_override("gas", all)
    }
}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fuels to process, in output order.
    pub fuels: Vec<String>,
    pub assignment: ModelAssignment,
    pub horizon_year: i32,
    pub cutoff_year: i32,
    pub allow_list: AllowList,
    pub renewables: Vec<String>,
    pub trend: TrendConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let assignment = ModelAssignment::new()
            .with("coal", ModelKind::Trend)
            .with("solar", ModelKind::Trend)
            .with("wind", ModelKind::Naive)
            .with("hydro", ModelKind::Linear)
            .with("nuclear", ModelKind::Naive)
            .with("oil", ModelKind::Naive)
            .with("gas", ModelKind::Naive)
            .with("bioenergy", ModelKind::Naive);

        Self {
            fuels: DEFAULT_FUELS.iter().map(|s| s.to_string()).collect(),
            assignment,
            horizon_year: DEFAULT_HORIZON_YEAR,
            cutoff_year: DEFAULT_CUTOFF_YEAR,
            allow_list: AllowList::default(),
            renewables: DEFAULT_RENEWABLES.iter().map(|s| s.to_string()).collect(),
            trend: TrendConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Rewrite every fuel name to its canonical key and drop blank manifest entries.
    pub fn normalize_fuel_names(&mut self) {
        self.fuels = normalize_list(&self.fuels);
        self.renewables = normalize_list(&self.renewables);
        self.assignment.normalize_keys();
        self.allow_list.normalize_keys();
    }

    /// Structural checks that make the whole run meaningless when violated.
    ///
    /// A manifest fuel without an assignment is *not* rejected here; it fails
    /// individually at forecast time.
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.fuels.is_empty() {
            return Err(ForecastError::InvalidInput("Fuel manifest is empty.".to_string()));
        }
        let mut seen = std::collections::BTreeSet::new();
        for fuel in &self.fuels {
            if !seen.insert(fuel.as_str()) {
                return Err(ForecastError::InvalidInput(format!(
                    "Fuel '{fuel}' appears twice in the manifest."
                )));
            }
        }
        self.trend.validate()
    }
}

/// Canonical keys, blanks removed, order kept.
pub fn normalize_list<S: AsRef<str>>(names: &[S]) -> Vec<String> {
    names
        .iter()
        .map(|n| normalize_fuel_name(n.as_ref()))
        .filter(|n| !n.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_production_setup() {
        let c = PipelineConfig::default();
        assert_eq!(c.fuels.len(), 8);
        assert_eq!(c.assignment.get("coal").unwrap(), ModelKind::Trend);
        assert_eq!(c.assignment.get("hydro").unwrap(), ModelKind::Linear);
        assert_eq!(c.assignment.get("wind").unwrap(), ModelKind::Naive);
        assert_eq!(c.allow_list.kinds_for("gas").len(), 3);
        assert_eq!(c.allow_list.kinds_for("wind"), &[ModelKind::Naive, ModelKind::Linear]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn config_parses_partial_json() {
        let json = r#"{
            "fuels": ["coal", "wind"],
            "assignment": {"coal": "prophet", "wind": "naive"},
            "horizon_year": 2030,
            "trend": {"changepoint_prior_scale": 0.5}
        }"#;
        let c: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c.fuels, vec!["coal", "wind"]);
        assert_eq!(c.assignment.get("coal").unwrap(), ModelKind::Trend);
        assert_eq!(c.horizon_year, 2030);
        assert_eq!(c.cutoff_year, DEFAULT_CUTOFF_YEAR);
        assert_eq!(c.trend.changepoint_prior_scale, 0.5);
        assert_eq!(c.trend.n_changepoints, 25);
    }

    #[test]
    fn fuel_names_are_normalised_across_every_section() {
        let json = r#"{
            "fuels": ["Coal", " Natural Gas ", ""],
            "assignment": {"COAL": "naive", "natural gas": "linear"},
            "renewables": ["Solar"],
            "allow_list": {"default": ["naive"], "overrides": {"Coal": ["trend"]}}
        }"#;
        let mut c: PipelineConfig = serde_json::from_str(json).unwrap();
        c.normalize_fuel_names();
        assert_eq!(c.fuels, vec!["coal", "natural_gas"]);
        assert_eq!(c.assignment.get("coal").unwrap(), ModelKind::Naive);
        assert_eq!(c.assignment.get("natural_gas").unwrap(), ModelKind::Linear);
        assert_eq!(c.renewables, vec!["solar"]);
        assert_eq!(c.allow_list.kinds_for("coal"), &[ModelKind::Trend]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_bad_trend_scale_and_duplicate_fuels() {
        let mut c = PipelineConfig::default();
        c.trend.changepoint_prior_scale = 0.0;
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.fuels.push("coal".to_string());
        assert!(c.validate().is_err());
    }
}
