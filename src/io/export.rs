//! Output tables.
//!
//! Column names here are what the dashboard reads; changing one needs a
//! matching change on that side.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{EmissionDetailRow, ForecastResult, RenewableShare, ValidationRecord, YearlySummary};
use crate::error::ForecastError;

pub const FORECASTS_DIR: &str = "forecasts";
pub const DETAIL_FILE: &str = "emissions_by_source_forecast.csv";
pub const SUMMARY_FILE: &str = "total_emission_forecast.csv";
pub const RENEWABLE_SHARE_FILE: &str = "renewable_share.csv";
pub const RUN_REPORT_FILE: &str = "run_report.json";
pub const VALIDATION_FILE: &str = "model_validation_results.csv";

/// `<dir>/forecasts/<fuel>_forecast.csv`.
pub fn forecast_path(out_dir: &Path, fuel: &str) -> PathBuf {
    out_dir.join(FORECASTS_DIR).join(format!("{fuel}_forecast.csv"))
}

/// Write one `ds,yhat` file per fuel; returns the paths written.
pub fn write_forecasts(out_dir: &Path, results: &[ForecastResult]) -> Result<Vec<PathBuf>, ForecastError> {
    fs::create_dir_all(out_dir.join(FORECASTS_DIR))?;
    results
        .iter()
        .map(|r| {
            let path = forecast_path(out_dir, r.fuel());
            write_forecast_csv(&path, r)?;
            Ok(path)
        })
        .collect()
}

pub fn write_forecast_csv(path: &Path, result: &ForecastResult) -> Result<(), ForecastError> {
    let mut w = csv::Writer::from_writer(File::create(path)?);
    w.write_record(["ds", "yhat"])?;
    for p in result.points() {
        w.write_record([year_start(p.year)?, p.value.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_detail_csv(path: &Path, rows: &[EmissionDetailRow]) -> Result<(), ForecastError> {
    let mut w = csv::Writer::from_writer(File::create(path)?);
    w.write_record(["year", "fuel", "generation_twh", "emission_mtco2"])?;
    for r in rows {
        w.write_record([
            r.year.to_string(),
            r.fuel.clone(),
            r.generation_twh.to_string(),
            r.emission_mtco2.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_summary_csv(path: &Path, rows: &[YearlySummary]) -> Result<(), ForecastError> {
    let mut w = csv::Writer::from_writer(File::create(path)?);
    w.write_record([
        "year",
        "total_generation_twh",
        "total_emission_mtco2",
        "emission_intensity_kgco2_per_mwh",
    ])?;
    for r in rows {
        w.write_record([
            r.year.to_string(),
            r.total_generation_twh.to_string(),
            r.total_emission_mtco2.to_string(),
            r.emission_intensity_kgco2_per_mwh.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_renewable_share_csv(path: &Path, rows: &[RenewableShare]) -> Result<(), ForecastError> {
    let mut w = csv::Writer::from_writer(File::create(path)?);
    w.write_record(["year", "renewable_share_pct"])?;
    for r in rows {
        w.write_record([r.year.to_string(), r.share_pct.to_string()])?;
    }
    w.flush()?;
    Ok(())
}

/// `Source,Model,RMSE,MAPE`; MAPE is a fraction or `undefined`.
pub fn write_validation_csv(path: &Path, records: &[ValidationRecord]) -> Result<(), ForecastError> {
    let mut w = csv::Writer::from_writer(File::create(path)?);
    w.write_record(["Source", "Model", "RMSE", "MAPE"])?;
    for r in records {
        w.write_record([
            r.source.clone(),
            r.model.display_name().to_string(),
            r.rmse.to_string(),
            r.mape.to_string(),
        ])?;
    }
    w.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ForecastError> {
    serde_json::to_writer_pretty(File::create(path)?, value)?;
    Ok(())
}

fn year_start(year: i32) -> Result<String, ForecastError> {
    NaiveDate::from_ymd_opt(year, 1, 1)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| ForecastError::InvalidInput(format!("Year {year} is out of range.")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastPoint, Measure, ModelKind};
    use crate::emissions::{EmissionAggregator, EmissionFactorTable};

    fn result(fuel: &str, values: &[f64]) -> ForecastResult {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| ForecastPoint {
                year: 2020 + i as i32,
                value,
            })
            .collect();
        ForecastResult::new(fuel, ModelKind::Naive, 2020, points).unwrap()
    }

    #[test]
    fn forecast_csv_uses_ds_yhat_with_year_start_dates() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_forecasts(dir.path(), &[result("coal", &[1.5, 2.0])]).unwrap();
        assert_eq!(paths[0], dir.path().join("forecasts").join("coal_forecast.csv"));
        let body = fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(body, "ds,yhat\n2020-01-01,1.5\n2021-01-01,2\n");
    }

    #[test]
    fn summary_csv_marks_undefined_intensity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SUMMARY_FILE);
        let rows = [YearlySummary {
            year: 2030,
            total_generation_twh: 0.0,
            total_emission_mtco2: 0.0,
            emission_intensity_kgco2_per_mwh: Measure::Undefined,
        }];
        write_summary_csv(&path, &rows).unwrap();
        let body = fs::read_to_string(&path).unwrap();
        assert_eq!(
            body,
            "year,total_generation_twh,total_emission_mtco2,emission_intensity_kgco2_per_mwh\n2030,0,0,undefined\n"
        );
    }

    #[test]
    fn repeated_aggregation_writes_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let factors = EmissionFactorTable::new([("coal", 820.0), ("solar", 41.0)]).unwrap();
        let agg = EmissionAggregator::new(factors, &["solar"]);
        let results = [result("coal", &[101.3, 99.7, 97.1]), result("solar", &[12.2, 18.9, 25.4])];

        let a = dir.path().join("a.csv");
        let b = dir.path().join("b.csv");
        write_summary_csv(&a, &agg.aggregate(&results).unwrap().summary).unwrap();
        write_summary_csv(&b, &agg.aggregate(&results).unwrap().summary).unwrap();
        assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
    }

    #[test]
    fn validation_csv_has_report_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(VALIDATION_FILE);
        let records = [ValidationRecord {
            source: "gas".to_string(),
            model: ModelKind::Trend,
            rmse: 1.25,
            mape: Measure::Value(0.5),
        }];
        write_validation_csv(&path, &records).unwrap();
        let body = fs::read_to_string(&path).unwrap();
        assert_eq!(body, "Source,Model,RMSE,MAPE\ngas,Trend,1.25,0.5\n");
    }
}
