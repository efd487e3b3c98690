//! Accuracy metrics for held-out predictions.

use crate::error::ForecastError;

/// Root-mean-squared error. Slices must be the same non-zero length.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, ForecastError> {
    check_lengths(actual, predicted)?;
    let sse: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    Ok((sse / actual.len() as f64).sqrt())
}

/// Mean absolute percentage error as a fraction (`0.1` means 10%).
///
/// Undefined when any actual value is exactly zero.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Result<f64, ForecastError> {
    check_lengths(actual, predicted)?;
    let zeros = actual.iter().filter(|a| **a == 0.0).count();
    if zeros > 0 {
        return Err(ForecastError::UndefinedMetric { zeros });
    }
    let total: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| ((a - p) / a).abs())
        .sum();
    Ok(total / actual.len() as f64)
}

fn check_lengths(actual: &[f64], predicted: &[f64]) -> Result<(), ForecastError> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return Err(ForecastError::Numeric(format!(
            "Metric needs equal, non-empty inputs (got {} actual, {} predicted).",
            actual.len(),
            predicted.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmse_matches_hand_computation() {
        let v = rmse(&[3.0, 5.0], &[1.0, 5.0]).unwrap();
        assert!((v - 2.0_f64.sqrt()).abs() < 1e-12);
        assert_eq!(rmse(&[1.0], &[1.0]).unwrap(), 0.0);
    }

    #[test]
    fn mape_is_a_fraction() {
        let v = mape(&[100.0, 50.0], &[90.0, 60.0]).unwrap();
        assert!((v - 0.15).abs() < 1e-12);
    }

    #[test]
    fn mape_with_zero_actual_is_undefined() {
        let err = mape(&[0.0, 2.0, 0.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ForecastError::UndefinedMetric { zeros: 2 }));
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert!(rmse(&[1.0, 2.0], &[1.0]).is_err());
        assert!(mape(&[], &[]).is_err());
    }
}
