//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments and resolves the run config
//! - runs the forecast or validation pipeline
//! - prints reports and writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, CommonArgs, ForecastArgs, ValidateArgs};
use crate::domain::{PipelineConfig, normalize_list};
use crate::error::{AppError, ForecastError};

pub mod pipeline;

/// Environment variable naming the JSON run config.
pub const CONFIG_ENV: &str = "EMF_CONFIG";

/// Entry point for the `emf` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Forecast(args) => handle_forecast(args),
        Command::Validate(args) => handle_validate(args),
    }
}

/// Log to stderr so stdout only carries the report tables.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let mut config = load_config(&args.common)?;
    if let Some(horizon) = args.horizon {
        config.horizon_year = horizon;
    }

    let paths = pipeline::ForecastPaths {
        generation: args.common.generation.clone(),
        factors: args.factors.clone(),
        out_dir: args.out_dir.clone(),
    };
    let output = pipeline::run_forecast(&config, &paths)?;

    println!("{}", crate::report::format_forecast_summary(&output.run));
    if let Some(kpi) = output.emissions.headline() {
        println!("{}", crate::report::format_headline(&kpi));
    }
    print!("{}", crate::report::format_unmapped(&output.report.unmapped_fuels));
    print!("{}", crate::report::format_failures("Forecast failures", &output.report.failures));

    Ok(())
}

fn handle_validate(args: ValidateArgs) -> Result<(), AppError> {
    let mut config = load_config(&args.common)?;
    if let Some(cutoff) = args.cutoff {
        config.cutoff_year = cutoff;
    }

    let report = pipeline::run_backtest(&config, &args.common.generation)?;

    println!("{}", crate::report::format_validation_table(&report));
    print!("{}", crate::report::format_failures("Validation failures", &report.failures));

    if let Some(path) = &args.export {
        crate::io::write_validation_csv(path, &report.records)?;
    }
    Ok(())
}

/// Resolve the run config: JSON file (flag, then `EMF_CONFIG`) or defaults,
/// with CLI overrides applied on top.
pub fn load_config(common: &CommonArgs) -> Result<PipelineConfig, ForecastError> {
    let path = common
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    let config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading run config");
            crate::io::load_pipeline_config(&path)?
        }
        None => PipelineConfig::default(),
    };
    apply_overrides(config, common)
}

/// Apply manifest and trend flags, then re-validate.
pub fn apply_overrides(mut config: PipelineConfig, common: &CommonArgs) -> Result<PipelineConfig, ForecastError> {
    if let Some(fuels) = &common.fuels {
        config.fuels = normalize_list(fuels);
    }
    if let Some(scale) = common.trend_flexibility {
        config.trend.changepoint_prior_scale = scale;
    }
    config.validate()?;
    Ok(config)
}
