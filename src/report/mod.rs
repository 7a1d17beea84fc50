//! Reporting utilities: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::Observations;
use crate::error::AppError;
use crate::models::CompositeModel;

/// Observed minus model at one wavelength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumResidual {
    pub x: f64,
    pub y_obs: f64,
    pub y_model: f64,
    pub residual: f64,
}

/// Compute model values and residuals for each observation.
pub fn compute_residuals(
    obs: &Observations,
    model: &CompositeModel,
) -> Result<Vec<SpectrumResidual>, AppError> {
    let mut out = Vec::with_capacity(obs.len());
    for (&x, &y_obs) in obs.x.iter().zip(&obs.y) {
        let y_model = model.evaluate_at(x);
        if !y_model.is_finite() {
            return Err(AppError::new(
                4,
                format!("Non-finite model value at wavelength {x}."),
            ));
        }
        out.push(SpectrumResidual {
            x,
            y_obs,
            y_model,
            residual: y_obs - y_model,
        });
    }
    Ok(out)
}

/// The `top_n` residuals with the largest magnitude, largest first.
pub fn largest_residuals(residuals: &[SpectrumResidual], top_n: usize) -> Vec<SpectrumResidual> {
    let mut sorted = residuals.to_vec();
    sorted.sort_by(|a, b| {
        b.residual
            .abs()
            .partial_cmp(&a.residual.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sorted.truncate(top_n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BoundedParam, ProfileInfo};
    use crate::models::Component;

    #[test]
    fn residuals_and_ranking() {
        let model = CompositeModel::from_components([Component::Gaussian(ProfileInfo {
            name: "line".to_string(),
            x_0: BoundedParam::fixed(10.0),
            fwhm: BoundedParam::fixed(1.0),
            amplitude: BoundedParam::free(1.0),
        })]);
        let obs = Observations::new(vec![8.0, 10.0, 12.0], vec![0.5, 1.0, -2.0], None).unwrap();

        let residuals = compute_residuals(&obs, &model).unwrap();
        assert_eq!(residuals.len(), 3);
        assert!(residuals[1].residual.abs() < 1e-12);

        let top = largest_residuals(&residuals, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].x, 12.0);
        assert_eq!(top[1].x, 8.0);
    }
}
