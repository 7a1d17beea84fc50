//! Starting-value estimation from an observed spectrum.
//!
//! Only free amplitudes of additive components are touched:
//!
//! - stellar blackbodies (`T >= 2999 K`) are matched to the spectrum at
//!   `1.5 * λ_peak`, other blackbodies at `λ_peak` with a 0.2 scale
//! - lines and dust features take half the (non-negative) flux at `x_0`
//!
//! Guesses are clamped into bounds; non-finite guesses and features outside
//! the observed range keep the table value.

use crate::domain::{BoundedParam, ContinuumInfo, Observations, ParameterInfo, ProfileInfo};
use crate::math::interp;
use crate::models::profiles::{blackbody, modified_blackbody};

/// Wien displacement constant (µm K).
const WIEN_B: f64 = 2897.8;
/// Temperatures at or above this are treated as stellar continua.
const STELLAR_T_MIN: f64 = 2999.0;
/// Scale for dust continua, which overlap heavily.
const DUST_BB_SCALE: f64 = 0.2;
/// Fraction of the local flux given to each line / feature.
const FEATURE_SCALE: f64 = 0.5;

/// Copy of `info` with free amplitudes estimated from `obs`.
///
/// `obs.x` need not be sorted.
pub fn estimate_start(obs: &Observations, info: &ParameterInfo) -> ParameterInfo {
    let spectrum = SortedSpectrum::new(obs);
    let mut out = info.clone();

    for c in &mut out.blackbody {
        estimate_continuum(c, &spectrum, blackbody);
    }
    for c in &mut out.modified_blackbody {
        estimate_continuum(c, &spectrum, modified_blackbody);
    }
    for p in out.gaussian.iter_mut().chain(out.drude.iter_mut()) {
        estimate_feature(p, &spectrum);
    }

    out
}

struct SortedSpectrum {
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SortedSpectrum {
    fn new(obs: &Observations) -> Self {
        let mut pairs: Vec<(f64, f64)> = obs.x.iter().copied().zip(obs.y.iter().copied()).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let (x, y) = pairs.into_iter().unzip();
        Self { x, y }
    }

    fn range(&self) -> Option<(f64, f64)> {
        Some((*self.x.first()?, *self.x.last()?))
    }

    fn at(&self, x: f64) -> Option<f64> {
        interp(x, &self.x, &self.y)
    }
}

fn estimate_continuum(c: &mut ContinuumInfo, spectrum: &SortedSpectrum, shape: fn(f64, f64, f64) -> f64) {
    if c.amplitude.fixed {
        return;
    }
    let Some((lo, hi)) = spectrum.range() else { return };
    let t = c.temperature.value;

    let (lam, scale) = if t >= STELLAR_T_MIN {
        (1.5 * WIEN_B / t, 1.0)
    } else {
        (WIEN_B / t, DUST_BB_SCALE)
    };
    let lam = lam.clamp(lo, hi);

    let Some(flux) = spectrum.at(lam) else { return };
    let unit = shape(lam, 1.0, t);
    if !(unit.is_finite() && unit > 0.0) {
        return;
    }
    apply_guess(&mut c.amplitude, scale * flux / unit);
}

fn estimate_feature(p: &mut ProfileInfo, spectrum: &SortedSpectrum) {
    if p.amplitude.fixed {
        return;
    }
    let Some((lo, hi)) = spectrum.range() else { return };
    let x_0 = p.x_0.value;
    if x_0 < lo || x_0 > hi {
        return;
    }
    let Some(flux) = spectrum.at(x_0) else { return };
    apply_guess(&mut p.amplitude, FEATURE_SCALE * flux.max(0.0));
}

fn apply_guess(param: &mut BoundedParam, guess: f64) {
    if guess.is_finite() {
        param.set(guess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::linspace;

    fn ramp() -> Observations {
        Observations::new(linspace(1.0, 30.0, 100), linspace(1.0, 2.0, 100), None).unwrap()
    }

    fn feature(name: &str, x_0: f64, amp: BoundedParam) -> ProfileInfo {
        ProfileInfo {
            name: name.to_string(),
            x_0: BoundedParam::fixed(x_0),
            fwhm: BoundedParam::fixed(0.2),
            amplitude: amp,
        }
    }

    #[test]
    fn features_get_half_the_local_flux() {
        let mut info = ParameterInfo::default();
        info.drude.push(feature("PAH_15.5", 15.5, BoundedParam::free(0.0)));
        let out = estimate_start(&ramp(), &info);

        let expected = 0.5 * (1.0 + (15.5 - 1.0) / 29.0);
        assert!((out.drude[0].amplitude.value - expected).abs() < 1e-9);
    }

    #[test]
    fn fixed_bounded_and_out_of_range_amplitudes() {
        let mut info = ParameterInfo::default();
        info.gaussian.push(feature("fixed", 10.0, BoundedParam::fixed(7.0)));
        info.gaussian.push(feature(
            "capped",
            10.0,
            BoundedParam::free(0.0).with_bounds(Some(0.0), Some(0.1)),
        ));
        info.gaussian.push(feature("outside", 35.0, BoundedParam::free(3.0)));

        let out = estimate_start(&ramp(), &info);
        assert_eq!(out.gaussian[0].amplitude.value, 7.0);
        assert_eq!(out.gaussian[1].amplitude.value, 0.1);
        assert_eq!(out.gaussian[2].amplitude.value, 3.0);
    }

    #[test]
    fn blackbodies_reproduce_flux_at_reference_wavelength() {
        let mut info = ParameterInfo::default();
        for t in [5000.0, 200.0, 35.0] {
            info.blackbody.push(ContinuumInfo {
                name: format!("BB{t}"),
                temperature: BoundedParam::fixed(t),
                amplitude: BoundedParam::free(0.0).with_bounds(Some(0.0), None),
            });
        }
        let obs = ramp();
        let out = estimate_start(&obs, &info);

        // 200 K: λ_peak ≈ 14.5 µm lies inside the data, scale 0.2.
        let bb200 = &out.blackbody[1];
        let lam = WIEN_B / 200.0;
        let flux = interp(lam, &obs.x, &obs.y).unwrap();
        let model = blackbody(lam, bb200.amplitude.value, 200.0);
        assert!((model - 0.2 * flux).abs() < 1e-9 * flux);

        for c in &out.blackbody {
            assert!(c.amplitude.value.is_finite() && c.amplitude.value > 0.0, "{}", c.name);
        }
    }
}
