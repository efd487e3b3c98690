//! Command-line parsing for the emission forecaster.
//!
//! Argument parsing and command dispatch stay separate from the modeling code;
//! flags only override values of the run configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "emf",
    version,
    about = "Per-fuel electricity generation and CO2 emission forecaster"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Forecast every fuel to the horizon, aggregate emissions and write the output tables.
    Forecast(ForecastArgs),
    /// Backtest the allowed model kinds per fuel on years after the cutoff.
    Validate(ValidateArgs),
}

/// Options shared by both subcommands.
#[derive(Debug, Args, Clone)]
pub struct CommonArgs {
    /// Cleaned generation table (year + one column per fuel, TWh).
    #[arg(long, default_value = "result/cleaned_generation_data.csv")]
    pub generation: PathBuf,

    /// JSON run config. Falls back to the EMF_CONFIG variable (a `.env` file is read).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Comma-separated fuel manifest, replacing the configured one.
    #[arg(long, value_delimiter = ',')]
    pub fuels: Option<Vec<String>>,

    /// Trend flexibility (changepoint prior scale); higher follows recent data more closely.
    #[arg(long)]
    pub trend_flexibility: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Emission factor table (`source,kgco2_per_mwh`).
    #[arg(long, default_value = "data/emission_factors.csv")]
    pub factors: PathBuf,

    /// Directory for forecast and emission tables.
    #[arg(long, default_value = "result")]
    pub out_dir: PathBuf,

    /// Last year to forecast.
    #[arg(long)]
    pub horizon: Option<i32>,
}

#[derive(Debug, Args, Clone)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Last training year; later years are held out.
    #[arg(long)]
    pub cutoff: Option<i32>,

    /// Write the scores as CSV (`Source,Model,RMSE,MAPE`).
    #[arg(long)]
    pub export: Option<PathBuf>,
}
