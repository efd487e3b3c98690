//! Shared pipeline logic for the `forecast` and `validate` commands.
//!
//! forecast: load inputs -> per-fuel forecasts -> emissions -> output tables
//! validate: load inputs -> per-fuel backtests
//!
//! Missing inputs abort the run. Everything that goes wrong for a single fuel
//! is collected into the returned report instead.

use std::path::{Path, PathBuf};

use crate::domain::PipelineConfig;
use crate::emissions::{EmissionAggregator, EmissionReport};
use crate::error::ForecastError;
use crate::forecast::{ForecastRun, run_forecasts};
use crate::io::{self, DETAIL_FILE, RENEWABLE_SHARE_FILE, RUN_REPORT_FILE, SUMMARY_FILE};
use crate::models::BackendSet;
use crate::report::RunReport;
use crate::validation::{ValidationReport, run_validation};

/// Input locations for a forecast run.
#[derive(Debug, Clone)]
pub struct ForecastPaths {
    pub generation: PathBuf,
    pub factors: PathBuf,
    pub out_dir: PathBuf,
}

/// All computed outputs of a single `emf forecast` run.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub run: ForecastRun,
    pub emissions: EmissionReport,
    pub report: RunReport,
}

/// Execute the forecast pipeline and write every output table.
pub fn run_forecast(config: &PipelineConfig, paths: &ForecastPaths) -> Result<ForecastOutput, ForecastError> {
    // 1) Inputs. Either table missing ends the run.
    let table = io::load_generation_table(&paths.generation)?;
    let factors = io::load_emission_factors(&paths.factors)?;

    // 2) Per-fuel forecasts.
    let backends = BackendSet::new(&config.trend);
    let run = run_forecasts(&table, &config.fuels, &config.assignment, config.horizon_year, &backends);

    // 3) Emissions.
    let aggregator = EmissionAggregator::new(factors, &config.renewables);
    let emissions = aggregator.aggregate(&run.results)?;

    // 4) Outputs.
    let mut outputs = write_outputs(&paths.out_dir, &run, &emissions)?;
    let report_path = paths.out_dir.join(RUN_REPORT_FILE);
    outputs.push(report_path.clone());

    let report = RunReport {
        horizon_year: config.horizon_year,
        forecast_fuels: run.results.iter().map(|r| r.fuel().to_string()).collect(),
        failures: run.failures.clone(),
        unmapped_fuels: emissions.unmapped_fuels.clone(),
        outputs,
    };
    io::write_json(&report_path, &report)?;

    tracing::info!(
        forecasts = run.results.len(),
        failures = run.failures.len(),
        out_dir = %paths.out_dir.display(),
        "forecast run finished"
    );

    Ok(ForecastOutput { run, emissions, report })
}

fn write_outputs(out_dir: &Path, run: &ForecastRun, emissions: &EmissionReport) -> Result<Vec<PathBuf>, ForecastError> {
    std::fs::create_dir_all(out_dir)?;
    let mut outputs = io::write_forecasts(out_dir, &run.results)?;

    let detail = out_dir.join(DETAIL_FILE);
    io::write_detail_csv(&detail, &emissions.detail)?;
    let summary = out_dir.join(SUMMARY_FILE);
    io::write_summary_csv(&summary, &emissions.summary)?;
    let share = out_dir.join(RENEWABLE_SHARE_FILE);
    io::write_renewable_share_csv(&share, &emissions.renewable_share)?;

    outputs.extend([detail, summary, share]);
    Ok(outputs)
}

/// Execute the validation harness over the configured manifest.
pub fn run_backtest(config: &PipelineConfig, generation: &Path) -> Result<ValidationReport, ForecastError> {
    let table = io::load_generation_table(generation)?;
    let backends = BackendSet::new(&config.trend);
    let report = run_validation(&table, &config.fuels, &config.allow_list, config.cutoff_year, &backends);
    tracing::info!(
        records = report.records.len(),
        failures = report.failures.len(),
        cutoff = config.cutoff_year,
        "validation run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Measure, ModelAssignment, ModelKind};
    use std::fs;

    const GENERATION: &str = "year,coal,solar,wind,entity\n\
        2010,600,1,20,India\n\
        2011,650,2,24,India\n\
        2012,700,4,28,India\n\
        2013,720,8,,India\n\
        2014,760,16,34,India\n";

    const FACTORS: &str = "source,kgco2_per_mwh\ncoal,900\nsolar,0\n";

    fn setup() -> (tempfile::TempDir, ForecastPaths) {
        let dir = tempfile::tempdir().unwrap();
        let generation = dir.path().join("gen.csv");
        let factors = dir.path().join("factors.csv");
        fs::write(&generation, GENERATION).unwrap();
        fs::write(&factors, FACTORS).unwrap();
        let paths = ForecastPaths {
            generation,
            factors,
            out_dir: dir.path().join("result"),
        };
        (dir, paths)
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            fuels: ["coal", "solar", "wind", "hydro"].iter().map(|s| s.to_string()).collect(),
            assignment: ModelAssignment::new()
                .with("coal", ModelKind::Linear)
                .with("solar", ModelKind::Trend)
                .with("wind", ModelKind::Naive)
                .with("hydro", ModelKind::Naive),
            horizon_year: 2020,
            renewables: vec!["solar".to_string(), "wind".to_string()],
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn forecast_run_writes_tables_and_reports_failures() {
        let (_dir, paths) = setup();
        let out = run_forecast(&config(), &paths).unwrap();

        assert_eq!(out.report.forecast_fuels, vec!["coal", "solar", "wind"]);
        assert_eq!(out.report.failures.len(), 1);
        assert_eq!(out.report.failures[0].fuel, "hydro");
        // Wind has no factor in the table.
        assert_eq!(out.report.unmapped_fuels, vec!["wind".to_string()]);

        for name in [DETAIL_FILE, SUMMARY_FILE, RENEWABLE_SHARE_FILE, RUN_REPORT_FILE] {
            assert!(paths.out_dir.join(name).exists(), "{name} missing");
        }
        let coal = fs::read_to_string(paths.out_dir.join("forecasts/coal_forecast.csv")).unwrap();
        assert!(coal.starts_with("ds,yhat\n2010-01-01,600\n"));
        assert_eq!(coal.lines().count(), 1 + 11);

        let last = out.emissions.summary.last().unwrap();
        assert_eq!(last.year, 2020);
        assert!(last.emission_intensity_kgco2_per_mwh.is_defined());
        let kpi = out.emissions.headline().unwrap();
        assert!(matches!(kpi.renewable_share_pct, Measure::Value(v) if v > 0.0 && v < 100.0));
    }

    #[test]
    fn missing_factor_table_is_fatal() {
        let (dir, mut paths) = setup();
        paths.factors = dir.path().join("nope.csv");
        let err = run_forecast(&config(), &paths).unwrap_err();
        assert!(matches!(err, ForecastError::InputMissing { .. }));
        assert!(!paths.out_dir.exists());
    }

    #[test]
    fn backtest_uses_allow_list_and_cutoff() {
        let (_dir, paths) = setup();
        let mut c = config();
        c.cutoff_year = 2012;
        let report = run_backtest(&c, &paths.generation).unwrap();
        // coal, solar: Naive + Linear + Trend; wind: Naive + Linear; hydro: absent.
        assert_eq!(report.records.iter().filter(|r| r.source == "coal").count(), 3);
        assert_eq!(report.records.iter().filter(|r| r.source == "wind").count(), 2);
        assert_eq!(report.failures.len(), 1);
    }
}
