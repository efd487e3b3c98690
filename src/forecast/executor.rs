//! Single-source forecasting.
//!
//! Given a series, a model kind and a horizon year:
//!
//! - fit the backend on the full observed history
//! - echo the history (interior gap years filled by linear interpolation)
//! - evaluate the fitted model for every year after the last observation
//! - clip every value at zero
//!
//! The function is pure; all outputs are returned in the `ForecastResult`.

use crate::domain::{ForecastPoint, ForecastResult, ModelAssignment, ModelKind, SourceSeries};
use crate::error::ForecastError;
use crate::models::BackendSet;

/// Forecast `series` with `kind` through `horizon_year`.
pub fn forecast_source(
    series: &SourceSeries,
    kind: ModelKind,
    horizon_year: i32,
    backends: &BackendSet,
) -> Result<ForecastResult, ForecastError> {
    let last = series.last();
    if horizon_year < last.year {
        return Err(ForecastError::InvalidInput(format!(
            "Horizon {horizon_year} is before the last observation of '{}' ({}).",
            series.fuel(),
            last.year
        )));
    }

    let fitted = backends.backend(kind).fit(series.fuel(), series.points())?;

    let mut points = echo_history(series);
    points.extend(((last.year + 1)..=horizon_year).map(|year| ForecastPoint {
        year,
        value: fitted.predict(year),
    }));
    clip_non_negative(&mut points);

    ForecastResult::new(series.fuel(), kind, last.year, points)
}

/// Forecast using the fuel's entry in `assignment`.
pub fn forecast_assigned(
    series: &SourceSeries,
    assignment: &ModelAssignment,
    horizon_year: i32,
    backends: &BackendSet,
) -> Result<ForecastResult, ForecastError> {
    let kind = assignment.get(series.fuel())?;
    forecast_source(series, kind, horizon_year, backends)
}

/// Generation cannot be negative.
pub fn clip_non_negative(points: &mut [ForecastPoint]) {
    for p in points {
        p.value = p.value.max(0.0);
    }
}

fn echo_history(series: &SourceSeries) -> Vec<ForecastPoint> {
    let obs = series.points();
    let mut out = Vec::with_capacity((series.last().year - series.first_year() + 1) as usize);
    out.push(ForecastPoint {
        year: obs[0].year,
        value: obs[0].value,
    });
    for pair in obs.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let gap = (b.year - a.year) as f64;
        for year in (a.year + 1)..b.year {
            let w = (year - a.year) as f64 / gap;
            out.push(ForecastPoint {
                year,
                value: a.value + w * (b.value - a.value),
            });
        }
        out.push(ForecastPoint {
            year: b.year,
            value: b.value,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Observation;
    use crate::models::{FittedModel, ModelBackend};
    use std::sync::Arc;

    fn series(pairs: &[(i32, f64)]) -> SourceSeries {
        SourceSeries::from_pairs("wind", pairs).unwrap()
    }

    #[test]
    fn naive_repeats_last_value_to_horizon() {
        let s = series(&[(2000, 10.0), (2001, 12.0), (2002, 14.0)]);
        let r = forecast_source(&s, ModelKind::Naive, 2004, &BackendSet::default()).unwrap();
        let future: Vec<f64> = r.future().iter().map(|p| p.value).collect();
        assert_eq!(future, vec![14.0, 14.0]);
        let years: Vec<i32> = r.points().iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2000, 2001, 2002, 2003, 2004]);
        assert_eq!(r.value_at(2001), Some(12.0));
    }

    #[test]
    fn linear_extends_perfect_line() {
        let s = series(&[(2000, 1.0), (2001, 2.0), (2002, 3.0)]);
        let r = forecast_source(&s, ModelKind::Linear, 2003, &BackendSet::default()).unwrap();
        assert!((r.value_at(2003).unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn declining_line_is_clipped_at_zero() {
        let s = series(&[(2000, 9.0), (2001, 6.0), (2002, 3.0)]);
        let r = forecast_source(&s, ModelKind::Linear, 2010, &BackendSet::default()).unwrap();
        assert!(r.points().iter().all(|p| p.value >= 0.0));
        assert_eq!(r.value_at(2010), Some(0.0));
    }

    #[test]
    fn gaps_in_history_are_interpolated() {
        let s = series(&[(2000, 2.0), (2003, 8.0)]);
        let r = forecast_source(&s, ModelKind::Naive, 2004, &BackendSet::default()).unwrap();
        let values: Vec<f64> = r.points().iter().map(|p| p.value).collect();
        assert_eq!(values.len(), 5);
        assert!((values[1] - 4.0).abs() < 1e-12);
        assert!((values[2] - 6.0).abs() < 1e-12);
        assert_eq!(values[4], 8.0);
    }

    #[test]
    fn insufficient_history_for_linear() {
        let s = series(&[(2000, 1.0)]);
        let err = forecast_source(&s, ModelKind::Linear, 2005, &BackendSet::default()).unwrap_err();
        assert!(matches!(err, ForecastError::InsufficientData { .. }));
    }

    #[test]
    fn horizon_before_last_observation_is_rejected() {
        let s = series(&[(2000, 1.0), (2001, 1.0)]);
        let err = forecast_source(&s, ModelKind::Naive, 2000, &BackendSet::default()).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)));

        let same = forecast_source(&s, ModelKind::Naive, 2001, &BackendSet::default()).unwrap();
        assert!(same.future().is_empty());
    }

    #[test]
    fn unassigned_fuel_fails() {
        let s = series(&[(2000, 1.0)]);
        let assignment = ModelAssignment::new().with("coal", ModelKind::Naive);
        let err = forecast_assigned(&s, &assignment, 2005, &BackendSet::default()).unwrap_err();
        assert!(matches!(err, ForecastError::UnknownModelKind(_)));
    }

    #[derive(Debug)]
    struct Negative;

    impl FittedModel for Negative {
        fn predict(&self, _year: i32) -> f64 {
            -5.0
        }
    }

    #[derive(Debug)]
    struct NegativeTrend;

    impl ModelBackend for NegativeTrend {
        fn fit(&self, _fuel: &str, _history: &[Observation]) -> Result<Box<dyn FittedModel>, ForecastError> {
            Ok(Box::new(Negative))
        }
    }

    #[test]
    fn stubbed_trend_goes_through_the_same_post_processing() {
        let backends = BackendSet::default().with_trend(Arc::new(NegativeTrend));
        let s = series(&[(2000, 1.0), (2001, 2.0)]);
        let r = forecast_source(&s, ModelKind::Trend, 2003, &backends).unwrap();
        assert_eq!(r.value_at(2002), Some(0.0));
        assert_eq!(r.value_at(2003), Some(0.0));
        assert_eq!(r.value_at(2001), Some(2.0));
    }
}
