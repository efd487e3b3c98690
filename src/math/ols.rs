//! Least squares.
//!
//! Two flavours are needed by the backends:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2                     (ordinary)
//! minimize ½ Σ (y_i - x_i^T β)^2 + Σ λ_j |β_j|     (L1-penalized)
//! ```
//!
//! The ordinary problem is solved through SVD so that tall design matrices and
//! nearly collinear columns (e.g. a short history of large year numbers) are
//! handled without panicking. The penalized problem has no closed form and is
//! solved by a capped number of reweighted ordinary solves.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Intercept and slope of a fitted line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub intercept: f64,
    pub slope: f64,
}

impl Line {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least squares line through `(x_i, y_i)`.
///
/// Requires at least two distinct x values.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<Line> {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return None;
    }
    let mut design = DMatrix::<f64>::zeros(n, 2);
    for (i, &x) in xs.iter().enumerate() {
        design[(i, 0)] = 1.0;
        design[(i, 1)] = x;
    }
    let y = DVector::from_column_slice(ys);
    let beta = solve_least_squares(&design, &y)?;
    Some(Line {
        intercept: beta[0],
        slope: beta[1],
    })
}

/// Result of a penalized solve.
#[derive(Debug, Clone)]
pub struct PenalizedFit {
    pub beta: Vec<f64>,
    pub iterations: usize,
    pub converged: bool,
}

/// Floor on `|β_j|` when turning the L1 term into a quadratic weight.
const IRLS_EPS: f64 = 1e-9;

/// A penalized coefficient below this magnitude is fixed at exactly zero.
///
/// Reweighting only shrinks such a coefficient geometrically toward zero; once
/// it is this small it no longer moves the fit.
pub const PRUNE_BELOW: f64 = 1e-6;

/// L1-penalized least squares by iteratively reweighted ridge.
///
/// Each pass replaces `λ_j |β_j|` with `½ w_j β_j²`, `w_j = λ_j / max(|β_j|, ε)`
/// from the previous pass, and solves the augmented ordinary problem
///
/// ```text
/// [ X        ] β ≈ [ y ]
/// [ sqrt(W)  ]     [ 0 ]
/// ```
///
/// - `penalty[j] = 0` leaves column `j` unpenalized
/// - a penalized coefficient that falls below [`PRUNE_BELOW`] is set to zero and
///   its column dropped for the remaining passes
/// - stops after `max_iterations` passes or once the largest change among the
///   remaining coefficients drops below `tolerance`
///
/// Returns `None` when an augmented solve fails.
pub fn penalized_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    penalty: &[f64],
    max_iterations: usize,
    tolerance: f64,
) -> Option<PenalizedFit> {
    let n = x.nrows();
    let p = x.ncols();
    debug_assert_eq!(penalty.len(), p);

    let penalized: Vec<usize> = (0..p).filter(|&j| penalty[j] > 0.0).collect();
    let m = penalized.len();

    let mut aug = DMatrix::<f64>::zeros(n + m, p);
    aug.view_mut((0, 0), (n, p)).copy_from(x);
    let mut rhs = DVector::<f64>::zeros(n + m);
    rhs.rows_mut(0, n).copy_from(y);

    // Start from a ridge solve (|β_j| taken as 1).
    let mut weights: Vec<f64> = penalized.iter().map(|&j| penalty[j]).collect();
    let mut pruned = vec![false; p];
    let mut beta: Vec<f64> = vec![0.0; p];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        iterations += 1;
        for (row, (&j, &w)) in penalized.iter().zip(&weights).enumerate() {
            aug.row_mut(n + row).fill(0.0);
            if !pruned[j] {
                aug[(n + row, j)] = w.sqrt();
            }
        }

        // A zeroed column gets the minimum-norm coefficient, i.e. exactly 0.
        let next = solve_least_squares(&aug, &rhs)?;
        let max_delta = (0..p)
            .filter(|&j| !pruned[j])
            .map(|j| (next[j] - beta[j]).abs())
            .fold(0.0_f64, f64::max);
        beta = next.iter().copied().collect();

        for &j in &penalized {
            if !pruned[j] && iterations > 1 && beta[j].abs() < PRUNE_BELOW {
                pruned[j] = true;
                aug.column_mut(j).fill(0.0);
            }
            if pruned[j] {
                beta[j] = 0.0;
            }
        }

        if iterations > 1 && max_delta < tolerance {
            converged = true;
            break;
        }
        for (w, &j) in weights.iter_mut().zip(&penalized) {
            *w = penalty[j] / beta[j].abs().max(IRLS_EPS);
        }
    }

    Some(PenalizedFit {
        beta,
        iterations,
        converged,
    })
}
