//! Error types.
//!
//! Library code returns [`ForecastError`]. The binary converts it into
//! [`AppError`], which carries the process exit code:
//!
//! - `2`: missing or invalid input / configuration
//! - `3`: not enough data for the requested model or split
//! - `4`: numeric failures (undefined metrics, solver breakdowns)

use thiserror::Error;

use crate::domain::ModelKind;

/// Everything that can go wrong inside the forecasting core.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// A required input table is absent. Fatal for the whole run.
    #[error("Missing input '{path}'. {remedy}")]
    InputMissing { path: String, remedy: String },

    #[error("Insufficient data for {fuel}: {model} needs at least {required} points, got {available}.")]
    InsufficientData {
        fuel: String,
        model: ModelKind,
        required: usize,
        available: usize,
    },

    #[error("Empty validation set for {fuel}: no observations after cutoff year {cutoff}.")]
    EmptyValidationSet { fuel: String, cutoff: i32 },

    #[error("No model assignment for fuel '{0}'.")]
    UnknownModelKind(String),

    #[error("No emission factor for fuel '{0}'; using 0.")]
    UnknownFuelFactor(String),

    #[error("MAPE is undefined: {zeros} actual value(s) are exactly zero.")]
    UndefinedMetric { zeros: usize },

    #[error("Fuel '{0}' is not present in the generation table.")]
    UnknownSource(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Numeric failure: {0}")]
    Numeric(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForecastError {
    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            ForecastError::InsufficientData { .. } | ForecastError::EmptyValidationSet { .. } => 3,
            ForecastError::UndefinedMetric { .. } | ForecastError::Numeric(_) => 4,
            _ => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let missing = ForecastError::InputMissing {
            path: "gen.csv".to_string(),
            remedy: "Run the cleaning step first.".to_string(),
        };
        assert_eq!(AppError::from(missing).exit_code(), 2);

        let short = ForecastError::InsufficientData {
            fuel: "hydro".to_string(),
            model: ModelKind::Linear,
            required: 2,
            available: 1,
        };
        assert_eq!(short.exit_code(), 3);
        assert_eq!(ForecastError::UndefinedMetric { zeros: 1 }.exit_code(), 4);
    }

    #[test]
    fn input_missing_message_carries_remedy() {
        let err = ForecastError::InputMissing {
            path: "result/cleaned_generation_data.csv".to_string(),
            remedy: "Run the cleaning step first.".to_string(),
        };
        let msg = AppError::from(err).to_string();
        assert!(msg.contains("cleaned_generation_data.csv"));
        assert!(msg.contains("Run the cleaning step first."));
    }
}
