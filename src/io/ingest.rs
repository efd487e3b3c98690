//! CSV and JSON ingest.
//!
//! Turns the cleaned generation table, the emission factor table and the
//! optional run config into validated domain values.
//!
//! - Headers are trimmed, lowercased, BOM-stripped and spaces become `_`
//! - Empty generation cells are missing observations, not zeros
//! - A missing input file is `InputMissing` with a hint on how to produce it

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{GenerationTable, PipelineConfig, normalize_fuel_name};
use crate::emissions::EmissionFactorTable;
use crate::error::ForecastError;

/// Columns the cleaning step may leave behind that are not fuels.
const NON_FUEL_COLUMNS: [&str; 2] = ["entity", "code"];

pub const GENERATION_REMEDY: &str =
    "Run the data cleaning step first; it writes the cleaned generation table (year + one column per fuel).";
pub const FACTORS_REMEDY: &str =
    "Provide an emission factor CSV with `source` and `kgco2_per_mwh` columns.";
pub const CONFIG_REMEDY: &str = "Check the --config flag or the EMF_CONFIG variable.";

/// Load the wide historical generation table.
pub fn load_generation_table(path: &Path) -> Result<GenerationTable, ForecastError> {
    let file = open_input(path, GENERATION_REMEDY)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);
    let year_idx = *header_map.get("year").ok_or_else(|| {
        ForecastError::InvalidInput(format!("'{}' has no `year` column.", path.display()))
    })?;

    let fuel_columns: Vec<(String, usize)> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .filter(|(name, idx)| *idx != year_idx && !name.is_empty() && !NON_FUEL_COLUMNS.contains(&name.as_str()))
        .collect();

    let mut years = Vec::new();
    let mut columns: BTreeMap<String, Vec<Option<f64>>> = fuel_columns
        .iter()
        .map(|(name, _)| (name.clone(), Vec::new()))
        .collect();

    for (idx, record) in reader.records().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        let record = record?;
        let year_cell = record.get(year_idx).unwrap_or("");
        if year_cell.is_empty() {
            tracing::debug!(line, "skipping row without a year");
            continue;
        }
        years.push(parse_year(year_cell).ok_or_else(|| {
            ForecastError::InvalidInput(format!("Line {line}: invalid year '{year_cell}'."))
        })?);

        for (name, col) in &fuel_columns {
            let cell = record.get(*col).unwrap_or("");
            let value = parse_opt_f64(cell).map_err(|_| {
                ForecastError::InvalidInput(format!("Line {line}: invalid `{name}` value '{cell}'."))
            })?;
            if let Some(column) = columns.get_mut(name) {
                column.push(value);
            }
        }
    }

    if years.is_empty() {
        return Err(ForecastError::InvalidInput(format!(
            "'{}' contains no data rows.",
            path.display()
        )));
    }

    tracing::info!(
        path = %path.display(),
        rows = years.len(),
        fuels = columns.len(),
        "generation table loaded"
    );
    GenerationTable::new(years, columns)
}

/// Load the emission factor table (kgCO2/MWh per fuel).
pub fn load_emission_factors(path: &Path) -> Result<EmissionFactorTable, ForecastError> {
    let file = open_input(path, FACTORS_REMEDY)?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let header_map = build_header_map(&reader.headers()?.clone());
    let fuel_idx = find_column(&header_map, &["source", "fuel"]).ok_or_else(|| {
        ForecastError::InvalidInput("Emission factor CSV needs a `source` (or `fuel`) column.".to_string())
    })?;
    let factor_idx = find_column(&header_map, &["kgco2_per_mwh", "factor"]).ok_or_else(|| {
        ForecastError::InvalidInput(
            "Emission factor CSV needs a `kgco2_per_mwh` (or `factor`) column.".to_string(),
        )
    })?;

    let mut entries = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let line = idx + 2;
        let record = record?;
        let fuel = record.get(fuel_idx).unwrap_or("");
        if fuel.is_empty() {
            continue;
        }
        let cell = record.get(factor_idx).unwrap_or("");
        let factor = parse_opt_f64(cell)
            .ok()
            .flatten()
            .ok_or_else(|| ForecastError::InvalidInput(format!("Line {line}: invalid factor '{cell}' for '{fuel}'.")))?;
        entries.push((fuel.to_string(), factor));
    }

    let table = EmissionFactorTable::new(entries)?;
    tracing::info!(path = %path.display(), fuels = table.len(), "emission factors loaded");
    Ok(table)
}

/// Load and validate a JSON run config. Absent keys take their defaults.
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig, ForecastError> {
    let file = open_input(path, CONFIG_REMEDY)?;
    let mut config: PipelineConfig = serde_json::from_reader(file)?;
    config.normalize_fuel_names();
    config.validate()?;
    Ok(config)
}

fn open_input(path: &Path, remedy: &str) -> Result<File, ForecastError> {
    File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ForecastError::InputMissing {
            path: path.display().to_string(),
            remedy: remedy.to_string(),
        },
        _ => ForecastError::Io(e),
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    normalize_fuel_name(name.trim().trim_start_matches('\u{feff}'))
}

fn find_column(header_map: &HashMap<String, usize>, names: &[&str]) -> Option<usize> {
    names.iter().find_map(|n| header_map.get(*n).copied())
}

/// Accepts `2015` and `2015.0`.
fn parse_year(s: &str) -> Option<i32> {
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let v = s.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0 && v.abs() < i32::MAX as f64).then_some(v as i32)
}

fn parse_opt_f64(s: &str) -> Result<Option<f64>, std::num::ParseFloatError> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    s.parse::<f64>().map(Some)
}
