//! Ramp and simulated spectra.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::Observations;
use crate::error::ModelError;
use crate::math::linspace;
use crate::models::CompositeModel;

/// Flux uncertainty assigned to every ramp sample.
pub const RAMP_UNC: f64 = 0.1;

/// Floor on the per-sample noise sigma, so zero-flux regions still get noise.
const MIN_SIGMA: f64 = 1e-6;

/// Evenly spaced wavelengths on `[x_min, x_max]` with flux rising linearly from 1 to 2.
pub fn ramp_observations(n: usize, x_min: f64, x_max: f64) -> Result<Observations, ModelError> {
    if n < 2 {
        return Err(ModelError::InvalidObservations(format!(
            "a ramp needs at least 2 points (got {n})"
        )));
    }
    if !(x_min.is_finite() && x_max.is_finite() && x_min > 0.0 && x_max > x_min) {
        return Err(ModelError::InvalidObservations(format!(
            "invalid ramp range [{x_min}, {x_max}] (must be finite, > 0, and increasing)"
        )));
    }

    let x = linspace(x_min, x_max, n);
    let y = linspace(1.0, 2.0, n);
    Observations::new(x, y, Some(vec![RAMP_UNC; n]))
}

/// Evaluate `model` on `x` and add seeded Gaussian noise.
///
/// Each sample gets `sigma = noise_rel * |model(x)|` (floored), which is also
/// reported as its uncertainty. `noise_rel = 0` yields the noiseless model.
pub fn simulate_spectrum(
    model: &CompositeModel,
    x: &[f64],
    noise_rel: f64,
    seed: u64,
) -> Result<Observations, ModelError> {
    if !(noise_rel.is_finite() && noise_rel >= 0.0) {
        return Err(ModelError::InvalidObservations(format!(
            "noise level must be finite and >= 0 (got {noise_rel})"
        )));
    }

    let clean = model.evaluate(x);
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ModelError::InvalidObservations(format!("noise distribution: {e}")))?;

    let mut y = Vec::with_capacity(clean.len());
    let mut unc = Vec::with_capacity(clean.len());
    for v in clean {
        let sigma = (noise_rel * v.abs()).max(MIN_SIGMA);
        let z: f64 = normal.sample(&mut rng);
        y.push(if noise_rel > 0.0 { v + sigma * z } else { v });
        unc.push(sigma);
    }

    Observations::new(x.to_vec(), y, Some(unc))
}
