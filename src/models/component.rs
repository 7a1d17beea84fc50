//! Sub-models: one instance per row of a science pack.
//!
//! `Component` is a closed enum over the known kinds. Evaluation and parameter
//! access dispatch with exhaustive `match`es, so adding a kind is a compile
//! error everywhere it needs handling.

use serde::{Deserialize, Serialize};

use crate::domain::{AttenuationInfo, BoundedParam, ComponentKind, ContinuumInfo, ProfileInfo};
use crate::models::profiles;

/// A single constructed sub-model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form")]
pub enum Component {
    #[serde(rename = "BlackBody1D")]
    BlackBody(ContinuumInfo),
    #[serde(rename = "ModifiedBlackBody1D")]
    ModifiedBlackBody(ContinuumInfo),
    #[serde(rename = "Gaussian1D")]
    Gaussian(ProfileInfo),
    #[serde(rename = "Drude1D")]
    Drude(ProfileInfo),
    #[serde(rename = "S07_attenuation")]
    Attenuation(AttenuationInfo),
    #[serde(rename = "att_Drude1D")]
    AttDrude(ProfileInfo),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::BlackBody(_) => ComponentKind::BlackBody,
            Component::ModifiedBlackBody(_) => ComponentKind::ModifiedBlackBody,
            Component::Gaussian(_) => ComponentKind::Gaussian,
            Component::Drude(_) => ComponentKind::Drude,
            Component::Attenuation(_) => ComponentKind::Attenuation,
            Component::AttDrude(_) => ComponentKind::AttDrude,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Component::BlackBody(c) | Component::ModifiedBlackBody(c) => &c.name,
            Component::Gaussian(p) | Component::Drude(p) | Component::AttDrude(p) => &p.name,
            Component::Attenuation(a) => &a.name,
        }
    }

    pub fn is_multiplicative(&self) -> bool {
        self.kind().is_multiplicative()
    }

    /// Evaluate at a single wavelength.
    ///
    /// Additive components return flux; attenuation components return a
    /// transmission factor.
    pub fn evaluate_at(&self, x: f64) -> f64 {
        match self {
            Component::BlackBody(c) => {
                profiles::blackbody(x, c.amplitude.value, c.temperature.value)
            }
            Component::ModifiedBlackBody(c) => {
                profiles::modified_blackbody(x, c.amplitude.value, c.temperature.value)
            }
            Component::Gaussian(p) => {
                profiles::gaussian(x, p.amplitude.value, p.x_0.value, p.fwhm.value)
            }
            Component::Drude(p) => profiles::drude(x, p.amplitude.value, p.x_0.value, p.fwhm.value),
            Component::Attenuation(a) => profiles::s07_attenuation(x, a.tau_sil.value),
            Component::AttDrude(p) => {
                profiles::att_drude(x, p.amplitude.value, p.x_0.value, p.fwhm.value)
            }
        }
    }

    /// Evaluate an additive component with its amplitude set to 1.
    ///
    /// Returns `None` for attenuation components (they have no linear amplitude).
    pub fn unit_shape_at(&self, x: f64) -> Option<f64> {
        match self {
            Component::BlackBody(c) => Some(profiles::blackbody(x, 1.0, c.temperature.value)),
            Component::ModifiedBlackBody(c) => {
                Some(profiles::modified_blackbody(x, 1.0, c.temperature.value))
            }
            Component::Gaussian(p) => Some(profiles::gaussian(x, 1.0, p.x_0.value, p.fwhm.value)),
            Component::Drude(p) => Some(profiles::drude(x, 1.0, p.x_0.value, p.fwhm.value)),
            Component::Attenuation(_) | Component::AttDrude(_) => None,
        }
    }

    /// Amplitude of an additive component (`None` for attenuation).
    pub fn amplitude(&self) -> Option<&BoundedParam> {
        match self {
            Component::BlackBody(c) | Component::ModifiedBlackBody(c) => Some(&c.amplitude),
            Component::Gaussian(p) | Component::Drude(p) => Some(&p.amplitude),
            Component::Attenuation(_) | Component::AttDrude(_) => None,
        }
    }

    pub fn amplitude_mut(&mut self) -> Option<&mut BoundedParam> {
        match self {
            Component::BlackBody(c) | Component::ModifiedBlackBody(c) => Some(&mut c.amplitude),
            Component::Gaussian(p) | Component::Drude(p) => Some(&mut p.amplitude),
            Component::Attenuation(_) | Component::AttDrude(_) => None,
        }
    }

    /// Named parameters in a stable order.
    pub fn parameters(&self) -> Vec<(&'static str, &BoundedParam)> {
        match self {
            Component::BlackBody(c) | Component::ModifiedBlackBody(c) => {
                vec![("temperature", &c.temperature), ("amplitude", &c.amplitude)]
            }
            Component::Gaussian(p) | Component::Drude(p) => vec![
                ("x_0", &p.x_0),
                ("fwhm", &p.fwhm),
                ("amplitude", &p.amplitude),
            ],
            Component::AttDrude(p) => {
                vec![("x_0", &p.x_0), ("fwhm", &p.fwhm), ("tau", &p.amplitude)]
            }
            Component::Attenuation(a) => vec![("tau_sil", &a.tau_sil)],
        }
    }

    /// Mutable counterpart of [`Component::parameters`], same order.
    pub fn parameters_mut(&mut self) -> Vec<(&'static str, &mut BoundedParam)> {
        match self {
            Component::BlackBody(c) | Component::ModifiedBlackBody(c) => vec![
                ("temperature", &mut c.temperature),
                ("amplitude", &mut c.amplitude),
            ],
            Component::Gaussian(p) | Component::Drude(p) => vec![
                ("x_0", &mut p.x_0),
                ("fwhm", &mut p.fwhm),
                ("amplitude", &mut p.amplitude),
            ],
            Component::AttDrude(p) => vec![
                ("x_0", &mut p.x_0),
                ("fwhm", &mut p.fwhm),
                ("tau", &mut p.amplitude),
            ],
            Component::Attenuation(a) => vec![("tau_sil", &mut a.tau_sil)],
        }
    }
}
