//! Weighted least squares solver.
//!
//! Amplitude refinement solves a small linear problem of the form:
//!
//! ```text
//! minimize Σ w_i (y_i - x_i^T a)^2
//! ```
//!
//! where each column of `X` is one sub-model evaluated with unit amplitude.
//!
//! Implementation choices:
//! - Rows are scaled by `sqrt(w_i)` and the result is solved as ordinary least squares.
//! - SVD is used so tall systems (many wavelengths, few amplitudes) and nearly
//!   degenerate columns (overlapping features) solve robustly.

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

/// Solve `min Σ w_i (y_i - x_i^T a)^2` by row scaling.
///
/// Returns `None` on dimension mismatch, invalid weights, or an unsolvable system.
pub fn solve_weighted_least_squares(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    w: &[f64],
) -> Option<DVector<f64>> {
    if x.nrows() != y.len() || y.len() != w.len() {
        return None;
    }
    if w.iter().any(|v| !v.is_finite() || *v <= 0.0) {
        return None;
    }

    let mut xw = x.clone();
    let mut yw = y.clone();
    for (i, &wi) in w.iter().enumerate() {
        let sw = wi.sqrt();
        xw.row_mut(i).scale_mut(sw);
        yw[i] *= sw;
    }
    solve_least_squares(&xw, &yw)
}
