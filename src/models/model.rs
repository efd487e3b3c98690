//! Backend interface and dispatch.
//!
//! Every backend turns a training history into a [`FittedModel`] that can be
//! evaluated at any year. The executor and the validation harness only see
//! these two traits, so a backend can be swapped (or stubbed in tests) without
//! touching either of them.

use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::{ModelKind, Observation, TrendConfig};
use crate::error::ForecastError;
use crate::models::{LinearBackend, NaiveBackend, TrendBackend};

/// A fitted model.
pub trait FittedModel: Debug + Send + Sync {
    /// Predicted value for `year` (unclipped).
    fn predict(&self, year: i32) -> f64;
}

/// A fitting strategy for one model kind.
pub trait ModelBackend: Debug + Send + Sync {
    /// Fit on `history` (years strictly increasing, at least one point).
    ///
    /// `fuel` is only used to label errors and log lines.
    fn fit(&self, fuel: &str, history: &[Observation]) -> Result<Box<dyn FittedModel>, ForecastError>;
}

/// One backend per [`ModelKind`].
#[derive(Debug, Clone)]
pub struct BackendSet {
    naive: Arc<dyn ModelBackend>,
    linear: Arc<dyn ModelBackend>,
    trend: Arc<dyn ModelBackend>,
}

impl BackendSet {
    pub fn new(trend: &TrendConfig) -> Self {
        Self {
            naive: Arc::new(NaiveBackend),
            linear: Arc::new(LinearBackend),
            trend: Arc::new(TrendBackend::new(trend.clone())),
        }
    }

    /// Replace the trend strategy.
    pub fn with_trend(mut self, trend: Arc<dyn ModelBackend>) -> Self {
        self.trend = trend;
        self
    }

    /// The single dispatch point from model kind to backend.
    pub fn backend(&self, kind: ModelKind) -> &dyn ModelBackend {
        match kind {
            ModelKind::Naive => self.naive.as_ref(),
            ModelKind::Linear => self.linear.as_ref(),
            ModelKind::Trend => self.trend.as_ref(),
        }
    }
}

impl Default for BackendSet {
    fn default() -> Self {
        Self::new(&TrendConfig::default())
    }
}

/// Shared guard for minimum history length.
pub(crate) fn require_points(
    fuel: &str,
    model: ModelKind,
    history: &[Observation],
    required: usize,
) -> Result<(), ForecastError> {
    if history.len() < required {
        return Err(ForecastError::InsufficientData {
            fuel: fuel.to_string(),
            model,
            required,
            available: history.len(),
        });
    }
    Ok(())
}
