//! Generation forecasts -> emissions and yearly summaries.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::domain::{EmissionDetailRow, ForecastResult, Measure, RenewableShare, YearlySummary, normalize_list};
use crate::emissions::factors::EmissionFactorTable;
use crate::emissions::units::intensity_kg_per_mwh;
use crate::error::ForecastError;

/// Everything the aggregation stage produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmissionReport {
    /// Sorted by (year, fuel).
    pub detail: Vec<EmissionDetailRow>,
    /// One row per year, ascending.
    pub summary: Vec<YearlySummary>,
    pub renewable_share: Vec<RenewableShare>,
    /// Fuels that had no factor and were counted at zero emission.
    pub unmapped_fuels: Vec<String>,
}

/// Headline figures for the final forecast year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeadlineKpis {
    pub year: i32,
    pub total_generation_twh: f64,
    pub total_emission_mtco2: f64,
    pub emission_intensity_kgco2_per_mwh: Measure,
    pub renewable_share_pct: Measure,
}

impl EmissionReport {
    pub fn headline(&self) -> Option<HeadlineKpis> {
        let last = self.summary.last()?;
        let share = self
            .renewable_share
            .iter()
            .find(|s| s.year == last.year)
            .map_or(Measure::Undefined, |s| s.share_pct);
        Some(HeadlineKpis {
            year: last.year,
            total_generation_twh: last.total_generation_twh,
            total_emission_mtco2: last.total_emission_mtco2,
            emission_intensity_kgco2_per_mwh: last.emission_intensity_kgco2_per_mwh,
            renewable_share_pct: share,
        })
    }
}

#[derive(Debug, Default)]
struct YearTotals {
    generation: f64,
    emission: f64,
    renewable: f64,
}

/// Converts forecasts into emissions using a fixed factor table.
#[derive(Debug, Clone)]
pub struct EmissionAggregator {
    factors: EmissionFactorTable,
    renewables: BTreeSet<String>,
}

impl EmissionAggregator {
    pub fn new<S: AsRef<str>>(factors: EmissionFactorTable, renewables: &[S]) -> Self {
        Self {
            factors,
            renewables: normalize_list(renewables).into_iter().collect(),
        }
    }

    /// Build detail rows, yearly summaries and the renewable share series.
    ///
    /// Each fuel may appear at most once in `results`. A fuel without a factor
    /// contributes its generation with zero emission and is listed in
    /// `unmapped_fuels`.
    pub fn aggregate(&self, results: &[ForecastResult]) -> Result<EmissionReport, ForecastError> {
        let mut seen = BTreeSet::new();
        let mut unmapped_fuels = Vec::new();
        let mut detail = Vec::new();

        for result in results {
            let fuel = result.fuel();
            if !seen.insert(fuel) {
                return Err(ForecastError::InvalidInput(format!(
                    "Fuel '{fuel}' has more than one forecast."
                )));
            }
            let factor = match self.factors.mt_per_twh(fuel) {
                Ok(f) => f,
                Err(err) => {
                    tracing::warn!(fuel, error = %err, "emission factor missing");
                    unmapped_fuels.push(fuel.to_string());
                    0.0
                }
            };
            detail.extend(result.points().iter().map(|p| EmissionDetailRow {
                year: p.year,
                fuel: fuel.to_string(),
                generation_twh: p.value,
                emission_mtco2: p.value * factor,
            }));
        }

        detail.sort_by(|a, b| a.year.cmp(&b.year).then_with(|| a.fuel.cmp(&b.fuel)));
        unmapped_fuels.sort();

        let mut totals: BTreeMap<i32, YearTotals> = BTreeMap::new();
        for row in &detail {
            let t = totals.entry(row.year).or_default();
            t.generation += row.generation_twh;
            t.emission += row.emission_mtco2;
            if self.renewables.contains(&row.fuel) {
                t.renewable += row.generation_twh;
            }
        }

        let mut summary = Vec::with_capacity(totals.len());
        let mut renewable_share = Vec::with_capacity(totals.len());
        for (&year, t) in &totals {
            let intensity = if t.generation > 0.0 {
                Measure::Value(intensity_kg_per_mwh(t.emission, t.generation))
            } else {
                Measure::Undefined
            };
            summary.push(YearlySummary {
                year,
                total_generation_twh: t.generation,
                total_emission_mtco2: t.emission,
                emission_intensity_kgco2_per_mwh: intensity,
            });
            renewable_share.push(RenewableShare {
                year,
                share_pct: Measure::ratio(t.renewable, t.generation).map(|r| r * 100.0),
            });
        }

        tracing::debug!(
            rows = detail.len(),
            years = summary.len(),
            unmapped = unmapped_fuels.len(),
            "emissions aggregated"
        );

        Ok(EmissionReport {
            detail,
            summary,
            renewable_share,
            unmapped_fuels,
        })
    }
}
