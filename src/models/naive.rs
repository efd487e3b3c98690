//! Constant extrapolation: every future year repeats the last observation.

use crate::domain::{ModelKind, Observation};
use crate::error::ForecastError;
use crate::models::model::{FittedModel, ModelBackend, require_points};

#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveBackend;

#[derive(Debug, Clone, Copy)]
pub struct NaiveFit {
    pub last_value: f64,
}

impl FittedModel for NaiveFit {
    fn predict(&self, _year: i32) -> f64 {
        self.last_value
    }
}

impl ModelBackend for NaiveBackend {
    fn fit(&self, fuel: &str, history: &[Observation]) -> Result<Box<dyn FittedModel>, ForecastError> {
        require_points(fuel, ModelKind::Naive, history, ModelKind::Naive.min_points())?;
        let last_value = history[history.len() - 1].value;
        Ok(Box::new(NaiveFit { last_value }))
    }
}
