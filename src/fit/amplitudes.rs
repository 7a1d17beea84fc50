//! Linear amplitude refinement.
//!
//! With every shape parameter and all attenuation held fixed, the model is
//! linear in the amplitudes of its additive components:
//!
//! ```text
//! y(x) ≈ att(x) * (Σ_fixed f_k(x) + Σ_free a_j * s_j(x))
//! ```
//!
//! where `s_j` is component `j` evaluated with unit amplitude. The free
//! amplitudes `a_j` are a bounded weighted least squares problem, solved with
//! an active-set loop:
//!
//! 1. solve the unpinned amplitudes (columns scaled to unit norm, SVD)
//! 2. pin every amplitude that left its bounds at the violated bound and move
//!    its contribution into the target
//! 3. repeat until no unpinned amplitude violates its bounds
//!
//! The refined amplitudes are only kept if they do not increase the SSE.

use nalgebra::{DMatrix, DVector};

use crate::domain::{BoundedParam, Observations};
use crate::error::ModelError;
use crate::math::solve_weighted_least_squares;
use crate::models::CompositeModel;

/// Result of an amplitude refinement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmplitudeFit {
    /// Weighted sum of squared residuals after refinement.
    pub sse: f64,
    /// Unweighted root mean squared residual after refinement.
    pub rmse: f64,
    /// Weighted SSE of the starting amplitudes.
    pub start_sse: f64,
    /// Unweighted RMSE of the starting amplitudes.
    pub start_rmse: f64,
    /// Number of amplitudes solved for.
    pub n_free: usize,
    /// Solved amplitudes that ended on one of their bounds.
    pub n_at_bound: usize,
    /// The solve did not improve on the starting amplitudes, which were kept.
    pub kept_start: bool,
}

/// Solve for all free additive amplitudes of `model` against `obs` and write them back.
///
/// Every solved amplitude lies within its bounds. If the solution scores worse
/// than the starting amplitudes, the model is left unchanged. A model with no
/// free amplitudes is only scored.
pub fn refine_amplitudes(
    model: &mut CompositeModel,
    obs: &Observations,
) -> Result<AmplitudeFit, ModelError> {
    obs.validate()?;

    let free: Vec<(usize, BoundedParam)> = model
        .additive()
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.amplitude().filter(|a| !a.fixed).map(|a| (i, *a)))
        .collect();

    let (start_sse, start_rmse) = score(model, obs);
    let mut fit = AmplitudeFit {
        sse: start_sse,
        rmse: start_rmse,
        start_sse,
        start_rmse,
        n_free: free.len(),
        n_at_bound: 0,
        kept_start: false,
    };
    if free.is_empty() {
        return Ok(fit);
    }

    let solved = solve_amplitudes(model, obs, &free)?;
    let start = model.clone();
    write_amplitudes(model, &free, &solved);

    let (sse, rmse) = score(model, obs);
    if sse > start_sse {
        log::warn!(
            "amplitude refinement raised SSE from {start_sse:.4e} to {sse:.4e}; keeping starting amplitudes"
        );
        *model = start;
        fit.kept_start = true;
        return Ok(fit);
    }

    fit.sse = sse;
    fit.rmse = rmse;
    fit.n_at_bound = free
        .iter()
        .zip(&solved)
        .filter(|((_, b), v)| b.min == Some(**v) || b.max == Some(**v))
        .count();
    log::debug!(
        "refined {} free amplitudes ({} at a bound), RMSE {:.4e} -> {:.4e}",
        fit.n_free,
        fit.n_at_bound,
        start_rmse,
        rmse
    );
    Ok(fit)
}

fn write_amplitudes(model: &mut CompositeModel, free: &[(usize, BoundedParam)], values: &[f64]) {
    let components = model.additive_mut();
    for (&(idx, _), &value) in free.iter().zip(values) {
        if let Some(amp) = components[idx].amplitude_mut() {
            amp.set(value);
        }
    }
}

fn solve_amplitudes(
    model: &CompositeModel,
    obs: &Observations,
    free: &[(usize, BoundedParam)],
) -> Result<Vec<f64>, ModelError> {
    let n = obs.len();
    let p = free.len();
    if n < p {
        return Err(ModelError::AmplitudeSolveFailed(format!(
            "{p} free amplitudes but only {n} observations"
        )));
    }

    let mut design = DMatrix::<f64>::zeros(n, p);
    let mut target = DVector::<f64>::zeros(n);
    for (i, (&x, &y)) in obs.x.iter().zip(&obs.y).enumerate() {
        let att = model.attenuation_at(x);
        // Fixed-amplitude components are moved to the left-hand side.
        let fixed: f64 = model
            .additive()
            .iter()
            .enumerate()
            .filter(|(k, _)| !free.iter().any(|(idx, _)| idx == k))
            .map(|(_, c)| c.evaluate_at(x))
            .sum();
        target[i] = y - att * fixed;

        for (j, (k, _)) in free.iter().enumerate() {
            let shape = model.additive()[*k].unit_shape_at(x).unwrap_or(0.0);
            design[(i, j)] = shape * att;
        }
    }

    if design.iter().chain(target.iter()).any(|v| !v.is_finite()) {
        return Err(ModelError::AmplitudeSolveFailed(
            "design matrix has non-finite entries".to_string(),
        ));
    }

    let bounds: Vec<BoundedParam> = free.iter().map(|(_, b)| *b).collect();
    bounded_least_squares(&design, &target, &weights(obs), &bounds)
}

/// Weighted least squares with per-amplitude bounds (active-set loop).
///
/// Columns with zero norm do not constrain their amplitude; it keeps its
/// current value.
fn bounded_least_squares(
    design: &DMatrix<f64>,
    target: &DVector<f64>,
    weights: &[f64],
    bounds: &[BoundedParam],
) -> Result<Vec<f64>, ModelError> {
    let p = bounds.len();
    let norms: Vec<f64> = (0..p).map(|j| design.column(j).norm()).collect();
    let mut pinned: Vec<Option<f64>> = bounds
        .iter()
        .zip(&norms)
        .map(|(b, &norm)| (norm <= 0.0).then_some(b.value))
        .collect();

    // Each pass either pins at least one amplitude or finishes.
    for _ in 0..=p {
        let open: Vec<usize> = (0..p).filter(|&j| pinned[j].is_none()).collect();
        if open.is_empty() {
            break;
        }

        let mut rhs = target.clone();
        for (j, v) in pinned.iter().enumerate() {
            if let Some(v) = v {
                rhs -= design.column(j) * *v;
            }
        }
        let mut sub = DMatrix::<f64>::zeros(design.nrows(), open.len());
        for (c, &j) in open.iter().enumerate() {
            sub.set_column(c, &(design.column(j) / norms[j]));
        }

        let scaled = solve_weighted_least_squares(&sub, &rhs, weights).ok_or_else(|| {
            ModelError::AmplitudeSolveFailed(format!(
                "weighted least squares failed for {} amplitudes on {} points",
                open.len(),
                design.nrows()
            ))
        })?;

        let values: Vec<f64> = open
            .iter()
            .enumerate()
            .map(|(c, &j)| scaled[c] / norms[j])
            .collect();
        let mut violated = false;
        for (&j, &v) in open.iter().zip(&values) {
            if !bounds[j].contains(v) {
                pinned[j] = Some(bounds[j].clamp(v));
                violated = true;
            }
        }
        if !violated {
            for (&j, &v) in open.iter().zip(&values) {
                pinned[j] = Some(v);
            }
            break;
        }
    }

    Ok(pinned
        .into_iter()
        .zip(bounds)
        .map(|(v, b)| v.unwrap_or(b.value))
        .collect())
}

fn weights(obs: &Observations) -> Vec<f64> {
    match &obs.unc {
        Some(unc) => unc.iter().map(|u| 1.0 / (u * u)).collect(),
        None => vec![1.0; obs.len()],
    }
}

fn score(model: &CompositeModel, obs: &Observations) -> (f64, f64) {
    let w = weights(obs);
    let mut sse = 0.0;
    let mut ss = 0.0;
    for ((&x, &y), wi) in obs.x.iter().zip(&obs.y).zip(w) {
        let r = y - model.evaluate_at(x);
        sse += wi * r * r;
        ss += r * r;
    }
    (sse, (ss / obs.len() as f64).sqrt())
}
