//! The composite model handed to fitting routines.
//!
//! ```text
//! model(x) = (Σ additive_i(x)) * Π attenuation_j(x)
//! ```
//!
//! Either side may be empty: an empty sum is 0, an empty product is 1.

use serde::{Deserialize, Serialize};

use crate::domain::ComponentKind;
use crate::error::ModelError;
use crate::models::Component;

/// Additive sub-models scaled by multiplicative attenuation sub-models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeModel {
    additive: Vec<Component>,
    attenuation: Vec<Component>,
}

/// A free parameter as seen by an external fitter.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeParameter {
    pub component: String,
    pub kind: ComponentKind,
    pub parameter: &'static str,
    pub value: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl CompositeModel {
    /// Assemble a model, routing each component to its side by kind.
    pub fn from_components(components: impl IntoIterator<Item = Component>) -> Self {
        let mut model = Self::default();
        for c in components {
            model.push(c);
        }
        model
    }

    pub fn push(&mut self, component: Component) {
        if component.is_multiplicative() {
            self.attenuation.push(component);
        } else {
            self.additive.push(component);
        }
    }

    pub fn additive(&self) -> &[Component] {
        &self.additive
    }

    pub fn attenuation(&self) -> &[Component] {
        &self.attenuation
    }

    /// All sub-models, additive first.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.additive.iter().chain(self.attenuation.iter())
    }

    pub fn len(&self) -> usize {
        self.additive.len() + self.attenuation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A model with no additive part evaluates to zero everywhere.
    pub fn is_degenerate(&self) -> bool {
        self.additive.is_empty()
    }

    /// Number of sub-models of `kind`.
    pub fn count(&self, kind: ComponentKind) -> usize {
        self.components().filter(|c| c.kind() == kind).count()
    }

    /// Sub-models of `kind`, in construction order.
    pub fn components_of(&self, kind: ComponentKind) -> Vec<&Component> {
        self.components().filter(|c| c.kind() == kind).collect()
    }

    /// Transmission factor from all attenuation components at `x`.
    pub fn attenuation_at(&self, x: f64) -> f64 {
        self.attenuation.iter().map(|c| c.evaluate_at(x)).product()
    }

    /// Unattenuated additive sum at `x`.
    pub fn emission_at(&self, x: f64) -> f64 {
        self.additive.iter().map(|c| c.evaluate_at(x)).sum()
    }

    /// Model value at a single wavelength.
    pub fn evaluate_at(&self, x: f64) -> f64 {
        if self.additive.is_empty() {
            return 0.0;
        }
        self.emission_at(x) * self.attenuation_at(x)
    }

    /// Model values over a wavelength grid.
    pub fn evaluate(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&xi| self.evaluate_at(xi)).collect()
    }

    /// Per-component attenuated contributions over `x`, keyed by component name.
    ///
    /// Attenuation components report their transmission curve.
    pub fn evaluate_components(&self, x: &[f64]) -> Vec<(String, Vec<f64>)> {
        let att: Vec<f64> = x.iter().map(|&xi| self.attenuation_at(xi)).collect();
        let mut out = Vec::with_capacity(self.len());
        for c in &self.additive {
            let values = x
                .iter()
                .zip(att.iter())
                .map(|(&xi, &a)| c.evaluate_at(xi) * a)
                .collect();
            out.push((c.name().to_string(), values));
        }
        for c in &self.attenuation {
            out.push((c.name().to_string(), x.iter().map(|&xi| c.evaluate_at(xi)).collect()));
        }
        out
    }

    /// Every non-fixed parameter, in a stable order.
    pub fn free_parameters(&self) -> Vec<FreeParameter> {
        let mut out = Vec::new();
        for c in self.components() {
            for (name, p) in c.parameters() {
                if p.fixed {
                    continue;
                }
                out.push(FreeParameter {
                    component: c.name().to_string(),
                    kind: c.kind(),
                    parameter: name,
                    value: p.value,
                    min: p.min,
                    max: p.max,
                });
            }
        }
        out
    }

    /// Current values of the free parameters, same order as [`Self::free_parameters`].
    pub fn free_values(&self) -> Vec<f64> {
        self.free_parameters().iter().map(|p| p.value).collect()
    }

    /// Overwrite the free parameters; values are clamped into their bounds.
    ///
    /// The model is left untouched if any value is rejected.
    pub fn set_free_values(&mut self, values: &[f64]) -> Result<(), ModelError> {
        let free = self.free_parameters();
        if values.len() != free.len() {
            return Err(ModelError::ParameterVectorLength {
                expected: free.len(),
                got: values.len(),
            });
        }
        if let Some((index, p)) = values
            .iter()
            .zip(&free)
            .enumerate()
            .find_map(|(i, (v, p))| (!v.is_finite()).then_some((i, p)))
        {
            return Err(ModelError::NonFiniteParameter {
                index,
                component: p.component.clone(),
                parameter: p.parameter.to_string(),
            });
        }

        let mut it = values.iter();
        for c in self.additive.iter_mut().chain(self.attenuation.iter_mut()) {
            for (_, p) in c.parameters_mut() {
                if p.fixed {
                    continue;
                }
                if let Some(&v) = it.next() {
                    p.set(v);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn additive_mut(&mut self) -> &mut [Component] {
        &mut self.additive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AttenuationInfo, BoundedParam, ContinuumInfo, ProfileInfo};
    use crate::math::linspace;

    fn sample_model() -> CompositeModel {
        CompositeModel::from_components([
            Component::BlackBody(ContinuumInfo {
                name: "BB300".to_string(),
                temperature: BoundedParam::fixed(300.0),
                amplitude: BoundedParam::free(1e-9).with_bounds(Some(0.0), None),
            }),
            Component::Attenuation(AttenuationInfo {
                name: "S07_att".to_string(),
                tau_sil: BoundedParam::free(0.5).with_bounds(Some(0.0), Some(10.0)),
            }),
            Component::Drude(ProfileInfo {
                name: "PAH_6.2".to_string(),
                x_0: BoundedParam::fixed(6.22),
                fwhm: BoundedParam::fixed(0.19),
                amplitude: BoundedParam::free(1.0).with_bounds(Some(0.0), None),
            }),
        ])
    }

    #[test]
    fn routes_components_by_kind() {
        let m = sample_model();
        assert_eq!(m.additive().len(), 2);
        assert_eq!(m.attenuation().len(), 1);
        assert_eq!(m.count(ComponentKind::Drude), 1);
        assert_eq!(m.count(ComponentKind::Gaussian), 0);
        assert!(!m.is_degenerate());
    }

    #[test]
    fn attenuation_scales_the_additive_sum() {
        let m = sample_model();
        let x = 9.7;
        let expected = m.emission_at(x) * m.attenuation_at(x);
        assert!((m.evaluate_at(x) - expected).abs() < 1e-15);
        assert!(m.attenuation_at(x) < 1.0);
    }

    #[test]
    fn empty_model_evaluates_to_zero() {
        let m = CompositeModel::default();
        assert!(m.is_degenerate());
        assert!(m.evaluate(&linspace(1.0, 30.0, 10)).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn free_parameter_vector_round_trips_and_clamps() {
        let mut m = sample_model();
        let free = m.free_parameters();
        let names: Vec<(&str, &str)> = free
            .iter()
            .map(|p| (p.component.as_str(), p.parameter))
            .collect();
        assert_eq!(
            names,
            vec![("BB300", "amplitude"), ("PAH_6.2", "amplitude"), ("S07_att", "tau_sil")]
        );

        m.set_free_values(&[2e-9, -5.0, 20.0]).unwrap();
        assert_eq!(m.free_values(), vec![2e-9, 0.0, 10.0]);

        let err = m.set_free_values(&[1.0]).unwrap_err();
        assert_eq!(err, ModelError::ParameterVectorLength { expected: 3, got: 1 });
    }

    #[test]
    fn non_finite_free_values_are_rejected_without_partial_writes() {
        let mut m = sample_model();
        let before = m.clone();
        let err = m.set_free_values(&[2e-9, f64::NAN, 1.0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::NonFiniteParameter {
                index: 1,
                component: "PAH_6.2".to_string(),
                parameter: "amplitude".to_string(),
            }
        );
        assert_eq!(m, before);
    }

    #[test]
    fn component_breakdown_sums_to_model() {
        let m = sample_model();
        let x = linspace(5.0, 15.0, 11);
        let total = m.evaluate(&x);
        let parts = m.evaluate_components(&x);
        assert_eq!(parts.len(), 3);
        for (i, &t) in total.iter().enumerate() {
            let sum: f64 = parts[..2].iter().map(|(_, v)| v[i]).sum();
            assert!((sum - t).abs() <= 1e-12 * t.abs().max(1.0));
        }
    }
}
