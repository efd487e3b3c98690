//! Ordinary least squares trend line.
//!
//! Years are centred on the mean training year before fitting; raw calendar
//! years (≈2000) make the `[1, year]` design badly conditioned.

use crate::domain::{ModelKind, Observation};
use crate::error::ForecastError;
use crate::math::{Line, fit_line};
use crate::models::model::{FittedModel, ModelBackend, require_points};

#[derive(Debug, Clone, Copy, Default)]
pub struct LinearBackend;

#[derive(Debug, Clone, Copy)]
pub struct LinearFit {
    pub origin: f64,
    pub line: Line,
}

impl FittedModel for LinearFit {
    fn predict(&self, year: i32) -> f64 {
        self.line.at(year as f64 - self.origin)
    }
}

impl ModelBackend for LinearBackend {
    fn fit(&self, fuel: &str, history: &[Observation]) -> Result<Box<dyn FittedModel>, ForecastError> {
        require_points(fuel, ModelKind::Linear, history, ModelKind::Linear.min_points())?;

        let origin = history.iter().map(|p| p.year as f64).sum::<f64>() / history.len() as f64;
        let xs: Vec<f64> = history.iter().map(|p| p.year as f64 - origin).collect();
        let ys: Vec<f64> = history.iter().map(|p| p.value).collect();

        let line = fit_line(&xs, &ys)
            .ok_or_else(|| ForecastError::Numeric(format!("Linear fit failed for '{fuel}'.")))?;
        tracing::debug!(fuel, slope = line.slope, "linear fit");

        Ok(Box::new(LinearFit { origin, line }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_line_extrapolates_exactly() {
        let history = [
            Observation::new(2000, 1.0),
            Observation::new(2001, 2.0),
            Observation::new(2002, 3.0),
        ];
        let fitted = LinearBackend.fit("hydro", &history).unwrap();
        assert!((fitted.predict(2003) - 4.0).abs() < 1e-9);
        assert!((fitted.predict(2000) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn single_point_is_insufficient() {
        let err = LinearBackend.fit("hydro", &[Observation::new(2000, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData { required: 2, available: 1, .. }
        ));
    }

    #[test]
    fn noisy_fit_minimizes_squared_error() {
        // Centred x = [-1.5, -0.5, 0.5, 1.5]: slope = Σxy / Σx² = 9 / 5.
        let history = [
            Observation::new(2010, 3.5),
            Observation::new(2011, 4.5),
            Observation::new(2012, 7.5),
            Observation::new(2013, 8.5),
        ];
        let fitted = LinearBackend.fit("hydro", &history).unwrap();
        let slope = fitted.predict(2014) - fitted.predict(2013);
        assert!((slope - 1.8).abs() < 1e-9);
    }
}
