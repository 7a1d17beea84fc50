//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - parsed from a science pack table
//! - carried into sub-models unchanged
//! - exported to JSON and reloaded for evaluation

use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Closed set of component kinds a science pack may contain.
///
/// The serialized names are the `Form` strings used in pack tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    #[serde(rename = "BlackBody1D")]
    BlackBody,
    #[serde(rename = "ModifiedBlackBody1D")]
    ModifiedBlackBody,
    #[serde(rename = "Gaussian1D")]
    Gaussian,
    #[serde(rename = "Drude1D")]
    Drude,
    #[serde(rename = "S07_attenuation")]
    Attenuation,
    #[serde(rename = "att_Drude1D")]
    AttDrude,
}

impl ComponentKind {
    /// Every known kind, in model assembly order.
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::BlackBody,
        ComponentKind::ModifiedBlackBody,
        ComponentKind::Gaussian,
        ComponentKind::Drude,
        ComponentKind::Attenuation,
        ComponentKind::AttDrude,
    ];

    /// The `Form` discriminator used in pack tables.
    pub fn form(self) -> &'static str {
        match self {
            ComponentKind::BlackBody => "BlackBody1D",
            ComponentKind::ModifiedBlackBody => "ModifiedBlackBody1D",
            ComponentKind::Gaussian => "Gaussian1D",
            ComponentKind::Drude => "Drude1D",
            ComponentKind::Attenuation => "S07_attenuation",
            ComponentKind::AttDrude => "att_Drude1D",
        }
    }

    /// Look up a kind by its exact `Form` string.
    pub fn from_form(form: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.form() == form.trim())
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ComponentKind::BlackBody => "blackbody",
            ComponentKind::ModifiedBlackBody => "modified blackbody",
            ComponentKind::Gaussian => "line (Gaussian)",
            ComponentKind::Drude => "dust feature (Drude)",
            ComponentKind::Attenuation => "silicate attenuation",
            ComponentKind::AttDrude => "absorption feature (Drude)",
        }
    }

    /// Attenuation kinds scale the additive sum instead of adding to it.
    pub fn is_multiplicative(self) -> bool {
        matches!(self, ComponentKind::Attenuation | ComponentKind::AttDrude)
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.form())
    }
}

impl FromStr for ComponentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_form(s).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|k| k.form()).collect();
            format!("unknown component form '{s}' (known: {})", known.join(", "))
        })
    }
}

/// A model parameter with optional bounds and a fixed flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundedParam {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub fixed: bool,
}

impl BoundedParam {
    /// A free, unbounded parameter.
    pub fn free(value: f64) -> Self {
        Self {
            value,
            min: None,
            max: None,
            fixed: false,
        }
    }

    /// A fixed parameter.
    pub fn fixed(value: f64) -> Self {
        Self {
            value,
            min: None,
            max: None,
            fixed: true,
        }
    }

    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Clamp `v` into `[min, max]` (missing bounds are open).
    pub fn clamp(&self, v: f64) -> f64 {
        let mut out = v;
        if let Some(lo) = self.min {
            out = out.max(lo);
        }
        if let Some(hi) = self.max {
            out = out.min(hi);
        }
        out
    }

    pub fn contains(&self, v: f64) -> bool {
        self.min.is_none_or(|lo| v >= lo) && self.max.is_none_or(|hi| v <= hi)
    }

    /// Set the value, clamped into bounds. Fixed parameters are left untouched.
    pub fn set(&mut self, v: f64) {
        if !self.fixed {
            self.value = self.clamp(v);
        }
    }
}

/// Parameters of a (modified) blackbody continuum component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuumInfo {
    pub name: String,
    pub temperature: BoundedParam,
    pub amplitude: BoundedParam,
}

/// Parameters of a profile component centred at `x_0` (lines, dust features,
/// absorption features). For absorption features `amplitude` is the optical
/// depth at the centre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileInfo {
    pub name: String,
    pub x_0: BoundedParam,
    pub fwhm: BoundedParam,
    pub amplitude: BoundedParam,
}

/// Parameters of the silicate attenuation component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttenuationInfo {
    pub name: String,
    pub tau_sil: BoundedParam,
}

/// Parameter sets grouped by component kind.
///
/// Every kind always has a (possibly empty) group, so downstream code can
/// iterate without presence checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub blackbody: Vec<ContinuumInfo>,
    pub modified_blackbody: Vec<ContinuumInfo>,
    pub gaussian: Vec<ProfileInfo>,
    pub drude: Vec<ProfileInfo>,
    pub attenuation: Vec<AttenuationInfo>,
    pub att_drude: Vec<ProfileInfo>,
}

impl ParameterInfo {
    /// Number of parameter sets of the given kind.
    pub fn count(&self, kind: ComponentKind) -> usize {
        match kind {
            ComponentKind::BlackBody => self.blackbody.len(),
            ComponentKind::ModifiedBlackBody => self.modified_blackbody.len(),
            ComponentKind::Gaussian => self.gaussian.len(),
            ComponentKind::Drude => self.drude.len(),
            ComponentKind::Attenuation => self.attenuation.len(),
            ComponentKind::AttDrude => self.att_drude.len(),
        }
    }

    pub fn total(&self) -> usize {
        ComponentKind::ALL.iter().map(|&k| self.count(k)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Kinds with at least one parameter set, in assembly order.
    pub fn present_kinds(&self) -> Vec<ComponentKind> {
        ComponentKind::ALL
            .into_iter()
            .filter(|&k| self.count(k) > 0)
            .collect()
    }

    /// Per-kind counts for every known kind (zero counts included).
    pub fn counts(&self) -> Vec<(ComponentKind, usize)> {
        ComponentKind::ALL
            .into_iter()
            .map(|k| (k, self.count(k)))
            .collect()
    }

    /// Empty the group of `kind`; the group itself stays present.
    pub fn clear(&mut self, kind: ComponentKind) {
        match kind {
            ComponentKind::BlackBody => self.blackbody.clear(),
            ComponentKind::ModifiedBlackBody => self.modified_blackbody.clear(),
            ComponentKind::Gaussian => self.gaussian.clear(),
            ComponentKind::Drude => self.drude.clear(),
            ComponentKind::Attenuation => self.attenuation.clear(),
            ComponentKind::AttDrude => self.att_drude.clear(),
        }
    }

    /// Copy of `self` with every parameter set of `kind` removed.
    pub fn without(&self, kind: ComponentKind) -> Self {
        let mut out = self.clone();
        out.clear(kind);
        out
    }
}

/// Observed spectrum: wavelength `x` (µm), flux `y`, optional uncertainty.
#[derive(Debug, Clone, PartialEq)]
pub struct Observations {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub unc: Option<Vec<f64>>,
}

impl Observations {
    /// Validate and wrap observation arrays.
    pub fn new(x: Vec<f64>, y: Vec<f64>, unc: Option<Vec<f64>>) -> Result<Self, ModelError> {
        let obs = Self { x, y, unc };
        obs.validate()?;
        Ok(obs)
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check lengths, finiteness and positivity of the wavelength grid.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.x.is_empty() {
            return Err(ModelError::InvalidObservations(
                "no observation points".to_string(),
            ));
        }
        if self.x.len() != self.y.len() {
            return Err(ModelError::InvalidObservations(format!(
                "x has {} values but y has {}",
                self.x.len(),
                self.y.len()
            )));
        }
        if let Some(unc) = &self.unc {
            if unc.len() != self.x.len() {
                return Err(ModelError::InvalidObservations(format!(
                    "x has {} values but unc has {}",
                    self.x.len(),
                    unc.len()
                )));
            }
            if unc.iter().any(|u| !u.is_finite() || *u <= 0.0) {
                return Err(ModelError::InvalidObservations(
                    "uncertainties must be finite and > 0".to_string(),
                ));
            }
        }
        if self.x.iter().any(|v| !v.is_finite() || *v <= 0.0) {
            return Err(ModelError::InvalidObservations(
                "wavelengths must be finite and > 0".to_string(),
            ));
        }
        if self.y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidObservations(
                "fluxes must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Observed wavelength range `(min, max)`.
    pub fn x_range(&self) -> (f64, f64) {
        let lo = self.x.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = self.x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (lo, hi)
    }
}

/// Options for model construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildOptions {
    /// Estimate free amplitudes from the observations before building.
    pub estimate_start: bool,
    /// Fail with `EmptyModel` instead of returning a degenerate model.
    pub require_components: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            estimate_start: true,
            require_components: false,
        }
    }
}

/// Where observations come from for a run.
#[derive(Debug, Clone, PartialEq)]
pub enum SpectrumSource {
    /// Read an observed spectrum CSV.
    File(PathBuf),
    /// Use an evenly spaced ramp spectrum on `[x_min, x_max]`.
    Ramp { points: usize, x_min: f64, x_max: f64 },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub pack: String,
    pub spectrum: SpectrumSource,
    pub options: BuildOptions,
    /// Component kinds dropped from the pack before parsing.
    pub exclude: Vec<ComponentKind>,
    /// Solve for free amplitudes after building.
    pub refine: bool,
    pub export_model: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forms_round_trip_through_from_form() {
        for kind in ComponentKind::ALL {
            assert_eq!(ComponentKind::from_form(kind.form()), Some(kind));
        }
        assert_eq!(ComponentKind::from_form("Lorentz1D"), None);
        assert!("gaussian1d".parse::<ComponentKind>().is_err());
    }

    #[test]
    fn without_keeps_other_groups() {
        let mut info = ParameterInfo::default();
        info.gaussian.push(ProfileInfo {
            name: "line".to_string(),
            x_0: BoundedParam::free(12.8),
            fwhm: BoundedParam::fixed(0.1),
            amplitude: BoundedParam::free(1.0),
        });
        info.attenuation.push(AttenuationInfo {
            name: "sil".to_string(),
            tau_sil: BoundedParam::free(0.5),
        });

        let trimmed = info.without(ComponentKind::Gaussian);
        assert_eq!(trimmed.count(ComponentKind::Gaussian), 0);
        assert_eq!(trimmed.attenuation, info.attenuation);
        assert_eq!(trimmed.present_kinds(), vec![ComponentKind::Attenuation]);
        assert_eq!(trimmed.counts().len(), ComponentKind::ALL.len());
    }

    #[test]
    fn bounded_param_clamps_and_respects_fixed() {
        let mut p = BoundedParam::free(1.0).with_bounds(Some(0.0), Some(2.0));
        p.set(5.0);
        assert_eq!(p.value, 2.0);
        p.set(-1.0);
        assert_eq!(p.value, 0.0);

        let mut fixed = BoundedParam::fixed(3.0);
        fixed.set(1.0);
        assert_eq!(fixed.value, 3.0);
    }

    #[test]
    fn observations_reject_mismatched_lengths() {
        let err = Observations::new(vec![1.0, 2.0], vec![1.0], None).unwrap_err();
        assert!(matches!(err, ModelError::InvalidObservations(_)));

        let err = Observations::new(vec![0.0, 2.0], vec![1.0, 1.0], None).unwrap_err();
        assert!(matches!(err, ModelError::InvalidObservations(_)));

        let obs = Observations::new(vec![3.0, 1.0], vec![1.0, 1.0], None).unwrap();
        assert_eq!(obs.x_range(), (1.0, 3.0));
    }
}
