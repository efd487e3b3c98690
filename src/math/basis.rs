//! Piecewise-linear trend basis.
//!
//! A trend with changepoints `s_1 < ... < s_k` is written as
//!
//! ```text
//! g(t) = k0 + m0 * t + Σ δ_j (t - s_j)+
//! ```
//!
//! so each `δ_j` is the slope change at `s_j`. After the last changepoint the
//! slope is `m0 + Σ δ_j`, which is what gets extrapolated.

/// Hinge function `(t - s)+`.
pub fn hinge(t: f64, s: f64) -> f64 {
    (t - s).max(0.0)
}

/// Fill the design row `[1, t, (t - s_1)+, ..., (t - s_k)+]`.
///
/// # Panics
/// Panics if `out.len() != changepoints.len() + 2`.
pub fn fill_trend_row(t: f64, changepoints: &[f64], out: &mut [f64]) {
    assert_eq!(out.len(), changepoints.len() + 2, "trend row has wrong length");
    out[0] = 1.0;
    out[1] = t;
    for (slot, &s) in out[2..].iter_mut().zip(changepoints) {
        *slot = hinge(t, s);
    }
}

/// Evaluate `g(t)` from coefficients `[k0, m0, δ_1..δ_k]`.
pub fn eval_trend(t: f64, changepoints: &[f64], coef: &[f64]) -> f64 {
    let mut g = coef[0] + coef[1] * t;
    for (&s, &delta) in changepoints.iter().zip(&coef[2..]) {
        g += delta * hinge(t, s);
    }
    g
}

/// Pick up to `max_count` changepoints among the scaled observation times `ts`.
///
/// Candidates are the observation times strictly after the first one and within the
/// first `range` fraction of the history (by index). When there are more candidates
/// than `max_count`, they are thinned evenly.
pub fn place_changepoints(ts: &[f64], max_count: usize, range: f64) -> Vec<f64> {
    let n = ts.len();
    if n < 3 || max_count == 0 {
        return Vec::new();
    }
    let hist = ((n as f64) * range).ceil() as usize;
    let hist = hist.clamp(1, n);
    // Index 0 and anything at/after `hist` are excluded.
    let candidates: Vec<f64> = ts[1..hist.min(n - 1)].to_vec();
    if candidates.len() <= max_count {
        return candidates;
    }

    let m = candidates.len();
    let mut out = Vec::with_capacity(max_count);
    for i in 0..max_count {
        let idx = if max_count == 1 {
            0
        } else {
            ((i as f64) * ((m - 1) as f64) / ((max_count - 1) as f64)).round() as usize
        };
        let s = candidates[idx];
        if out.last().is_none_or(|&prev| s > prev) {
            out.push(s);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_after_changepoint_is_sum_of_deltas() {
        let cps = [0.5];
        let coef = [1.0, 2.0, -1.0];
        let a = eval_trend(0.8, &cps, &coef);
        let b = eval_trend(0.9, &cps, &coef);
        assert!(((b - a) / 0.1 - 1.0).abs() < 1e-9);
        assert!((eval_trend(0.25, &cps, &coef) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn changepoints_stay_inside_range_and_ordered() {
        let ts: Vec<f64> = (0..11).map(|i| i as f64 / 10.0).collect();
        let cps = place_changepoints(&ts, 25, 0.8);
        assert!(!cps.is_empty());
        assert!(cps[0] > 0.0);
        assert!(cps.iter().all(|&s| s <= 0.8 + 1e-12));
        assert!(cps.windows(2).all(|w| w[0] < w[1]));

        let thinned = place_changepoints(&ts, 3, 0.8);
        assert_eq!(thinned.len(), 3);
    }

    #[test]
    fn too_short_history_has_no_changepoints() {
        assert!(place_changepoints(&[0.0, 1.0], 25, 0.8).is_empty());
    }

    #[test]
    fn trend_row_layout() {
        let mut row = [0.0; 4];
        fill_trend_row(0.7, &[0.2, 0.9], &mut row);
        assert_eq!(row[0], 1.0);
        assert_eq!(row[1], 0.7);
        assert!((row[2] - 0.5).abs() < 1e-12);
        assert_eq!(row[3], 0.0);
    }
}
