//! Additive piecewise-linear trend with automatic changepoints.
//!
//! Fitting steps:
//!
//! 1. scale time to `[0, 1]` over the history and values by their max |value|
//! 2. place candidate changepoints evenly over the first `changepoint_range` of
//!    the history
//! 3. solve `min ½‖y - g(t)‖² + λ Σ|δ_j|` for the base line and slope changes
//!
//! The slope changes carry a Laplace prior with scale `changepoint_prior_scale`,
//! so `λ = σ² / changepoint_prior_scale` with a fixed noise scale `σ`. A larger
//! prior scale means a smaller penalty and a trend that bends more readily
//! toward recent data.
//!
//! Forecasts extend the final segment, i.e. base slope plus every slope change.
//! There is no seasonal component; the data is annual.

use nalgebra::{DMatrix, DVector};

use crate::domain::{ModelKind, Observation, TrendConfig};
use crate::error::ForecastError;
use crate::math::{eval_trend, fill_trend_row, penalized_least_squares, place_changepoints};
use crate::models::model::{FittedModel, ModelBackend, require_points};

/// Assumed observation noise in scaled units.
const NOISE_SCALE: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct TrendBackend {
    config: TrendConfig,
}

impl TrendBackend {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    fn penalty(&self) -> f64 {
        NOISE_SCALE * NOISE_SCALE / self.config.changepoint_prior_scale
    }
}

impl Default for TrendBackend {
    fn default() -> Self {
        Self::new(TrendConfig::default())
    }
}

#[derive(Debug, Clone)]
pub struct TrendFit {
    pub start_year: f64,
    pub span: f64,
    pub y_scale: f64,
    /// Changepoint locations in scaled time.
    pub changepoints: Vec<f64>,
    /// `[k0, m0, δ_1..δ_k]` in scaled units.
    pub coef: Vec<f64>,
}

impl TrendFit {
    /// Slope of the last segment, in value units per year.
    pub fn final_slope(&self) -> f64 {
        let m: f64 = self.coef[1..].iter().sum();
        m * self.y_scale / self.span
    }
}

impl FittedModel for TrendFit {
    fn predict(&self, year: i32) -> f64 {
        let t = (year as f64 - self.start_year) / self.span;
        eval_trend(t, &self.changepoints, &self.coef) * self.y_scale
    }
}

impl ModelBackend for TrendBackend {
    fn fit(&self, fuel: &str, history: &[Observation]) -> Result<Box<dyn FittedModel>, ForecastError> {
        let required = self.config.min_points.max(ModelKind::Trend.min_points());
        require_points(fuel, ModelKind::Trend, history, required)?;

        let start_year = history[0].year as f64;
        let span = history[history.len() - 1].year as f64 - start_year;
        let ts: Vec<f64> = history.iter().map(|p| (p.year as f64 - start_year) / span).collect();

        let max_abs = history.iter().map(|p| p.value.abs()).fold(0.0_f64, f64::max);
        let y_scale = if max_abs > 0.0 { max_abs } else { 1.0 };

        let changepoints =
            place_changepoints(&ts, self.config.n_changepoints, self.config.changepoint_range);

        let n = history.len();
        let p = changepoints.len() + 2;
        let mut x = DMatrix::<f64>::zeros(n, p);
        let mut y = DVector::<f64>::zeros(n);
        let mut row = vec![0.0; p];
        for (i, obs) in history.iter().enumerate() {
            fill_trend_row(ts[i], &changepoints, &mut row);
            for (j, &v) in row.iter().enumerate() {
                x[(i, j)] = v;
            }
            y[i] = obs.value / y_scale;
        }

        let lambda = self.penalty();
        let mut penalty = vec![lambda; p];
        penalty[0] = 0.0;
        penalty[1] = 0.0;

        let solved = penalized_least_squares(
            &x,
            &y,
            &penalty,
            self.config.max_iterations,
            self.config.tolerance,
        )
        .ok_or_else(|| ForecastError::Numeric(format!("Trend fit failed for '{fuel}'.")))?;

        if !solved.converged {
            tracing::warn!(
                fuel,
                iterations = solved.iterations,
                "trend fit stopped at iteration budget before converging"
            );
        }

        let fit = TrendFit {
            start_year,
            span,
            y_scale,
            changepoints,
            coef: solved.beta,
        };
        tracing::debug!(
            fuel,
            changepoints = fit.changepoints.len(),
            iterations = solved.iterations,
            final_slope = fit.final_slope(),
            "trend fit"
        );

        Ok(Box::new(fit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LinearBackend;

    fn kinked_history() -> Vec<Observation> {
        // Flat at 10 through 2009, then +2 per year.
        (2000..=2019)
            .map(|y| {
                let v = if y <= 2009 { 10.0 } else { 10.0 + 2.0 * (y - 2009) as f64 };
                Observation::new(y, v)
            })
            .collect()
    }

    fn backend(scale: f64) -> TrendBackend {
        TrendBackend::new(TrendConfig {
            changepoint_prior_scale: scale,
            ..TrendConfig::default()
        })
    }

    #[test]
    fn straight_line_is_reproduced() {
        let history: Vec<Observation> =
            (2000..2010).map(|y| Observation::new(y, 5.0 + 1.5 * (y - 2000) as f64)).collect();
        let fitted = TrendBackend::default().fit("solar", &history).unwrap();
        assert!((fitted.predict(2012) - 23.0).abs() < 1e-6);
    }

    #[test]
    fn high_flexibility_follows_recent_slope() {
        let history = kinked_history();
        let fitted = backend(10.0).fit("solar", &history).unwrap();
        let f2020 = fitted.predict(2020);
        assert!((f2020 - 32.0).abs() < 1.0, "forecast {f2020} should track the recent slope");
    }

    #[test]
    fn low_flexibility_collapses_to_a_line() {
        let history = kinked_history();
        let trend = backend(1e-4).fit("coal", &history).unwrap();
        let linear = LinearBackend.fit("coal", &history).unwrap();
        for year in [2020, 2025, 2035] {
            assert!(
                (trend.predict(year) - linear.predict(year)).abs() < 1e-3,
                "year {year}: trend {} vs linear {}",
                trend.predict(year),
                linear.predict(year)
            );
        }
    }

    #[test]
    fn flexibility_orders_tail_tracking() {
        let history = kinked_history();
        let stiff = backend(1e-4).fit("coal", &history).unwrap().predict(2030);
        let loose = backend(10.0).fit("coal", &history).unwrap().predict(2030);
        // The recent slope (2/yr) is steeper than the whole-history average.
        assert!(loose > stiff);
    }

    #[test]
    fn short_history_is_insufficient() {
        let history = [Observation::new(2000, 1.0), Observation::new(2001, 2.0)];
        let err = TrendBackend::default().fit("gas", &history).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { required: 3, .. }));

        let relaxed = TrendBackend::new(TrendConfig {
            min_points: 2,
            ..TrendConfig::default()
        });
        let fitted = relaxed.fit("gas", &history).unwrap();
        assert!((fitted.predict(2002) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn iteration_budget_bounds_the_fit() {
        let one_pass = TrendBackend::new(TrendConfig {
            max_iterations: 1,
            ..TrendConfig::default()
        });
        let fitted = one_pass.fit("coal", &kinked_history()).unwrap();
        assert!(fitted.predict(2025).is_finite());
    }

    #[test]
    fn all_zero_history_stays_zero() {
        let history: Vec<Observation> = (2000..2006).map(|y| Observation::new(y, 0.0)).collect();
        let fitted = TrendBackend::default().fit("oil", &history).unwrap();
        assert!(fitted.predict(2030).abs() < 1e-12);
    }
}
