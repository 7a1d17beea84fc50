//! Line-shape and continuum profiles.
//!
//! All profiles take the wavelength `x` in µm and return a finite value for
//! any finite input:
//!
//! - `blackbody(x, amp, T) = amp * C1 / x^3 / (exp(C2 / (x T)) - 1)`
//! - `gaussian(x, amp, x_0, fwhm)`
//! - `drude(x, amp, x_0, fwhm) = amp * g^2 / ((x/x_0 - x_0/x)^2 + g^2)`, `g = fwhm / x_0`
//! - `s07_attenuation(x, tau_sil)` and `att_drude(x, tau, x_0, fwhm)`, both
//!   mixed-screen factors `(1 - exp(-tau)) / tau`
//!
//! Numerical notes:
//! - The blackbody denominator uses `exp_m1`, so the Rayleigh–Jeans limit stays
//!   accurate; an overflowing exponential gives 0.
//! - The mixed-screen factor uses a series for small optical depth (limit 1).
//! - Non-positive wavelengths give 0 for additive profiles and 1 for attenuation.

use crate::math::interp;

/// `2 h c^2` scaled for µm wavelengths and MJy/sr-like output units.
const BB_C1: f64 = 3.97289e13;
/// `h c / k` in µm K.
const BB_C2: f64 = 1.4387752e4;

/// `fwhm = FWHM_PER_SIGMA * sigma`.
const FWHM_PER_SIGMA: f64 = 2.354_820_045_030_949_3;

/// Threshold below which the mixed-screen factor uses a series.
const SMALL_TAU: f64 = 1e-6;

/// Kemper, Vriend & Tielens (2004) silicate profile, tabulated on 8–12.7 µm.
const KVT_WAV: [f64; 27] = [
    8.0, 8.2, 8.4, 8.6, 8.8, 9.0, 9.2, 9.4, 9.6, 9.7, 9.75, 9.8, 10.0, 10.2, 10.4, 10.6, 10.8,
    11.0, 11.2, 11.4, 11.6, 11.8, 12.0, 12.2, 12.4, 12.6, 12.7,
];
const KVT_INT: [f64; 27] = [
    0.06, 0.09, 0.16, 0.275, 0.415, 0.575, 0.755, 0.895, 0.98, 0.99, 1.0, 0.99, 0.94, 0.83,
    0.745, 0.655, 0.58, 0.525, 0.43, 0.35, 0.27, 0.20, 0.13, 0.09, 0.06, 0.045, 0.04314,
];

/// Growth rate of the short-wavelength extension of the KVT profile (per µm).
const KVT_SHORT_RATE: f64 = 2.03;
/// Weight of the `(9.7/x)^1.7` power-law term mixed into the KVT profile.
const KVT_BETA: f64 = 0.1;

/// Blackbody continuum.
pub fn blackbody(x: f64, amp: f64, temperature: f64) -> f64 {
    if x <= 0.0 || temperature <= 0.0 {
        return 0.0;
    }
    let denom = (BB_C2 / (x * temperature)).exp_m1();
    if !denom.is_finite() || denom <= 0.0 {
        return 0.0;
    }
    amp * BB_C1 / (x * x * x) / denom
}

/// Blackbody with a `λ^-2` emissivity normalised at 9.7 µm.
pub fn modified_blackbody(x: f64, amp: f64, temperature: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let emissivity = (9.7 / x).powi(2);
    blackbody(x, amp, temperature) * emissivity
}

/// Gaussian emission line parametrised by its FWHM.
pub fn gaussian(x: f64, amp: f64, x_0: f64, fwhm: f64) -> f64 {
    let sigma = fwhm / FWHM_PER_SIGMA;
    if sigma <= 0.0 {
        return 0.0;
    }
    let z = (x - x_0) / sigma;
    amp * (-0.5 * z * z).exp()
}

/// Drude profile (peak value `amp` at `x_0`).
pub fn drude(x: f64, amp: f64, x_0: f64, fwhm: f64) -> f64 {
    if x <= 0.0 || x_0 <= 0.0 {
        return 0.0;
    }
    let g = fwhm / x_0;
    let g2 = g * g;
    let d = x / x_0 - x_0 / x;
    let denom = d * d + g2;
    if denom <= 0.0 {
        return 0.0;
    }
    amp * g2 / denom
}

/// Mixed-screen attenuation factor `(1 - exp(-tau)) / tau`.
pub fn mixed_screen(tau: f64) -> f64 {
    if tau.abs() < SMALL_TAU {
        // Series: 1 - tau/2 + tau^2/6
        return 1.0 - tau / 2.0 + tau * tau / 6.0;
    }
    -(-tau).exp_m1() / tau
}

/// Normalised silicate opacity profile (peak ~1 at 9.7 µm).
pub fn kvt_profile(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let first = KVT_WAV[0];
    let last = KVT_WAV[KVT_WAV.len() - 1];
    let ext = if x < first {
        KVT_INT[0] * (KVT_SHORT_RATE * (x - first)).exp()
    } else if x < last {
        interp(x, &KVT_WAV, &KVT_INT).unwrap_or(0.0)
    } else {
        drude(x, 0.4, 18.0, 0.247 * 18.0)
    };
    (1.0 - KVT_BETA) * ext + KVT_BETA * (9.7 / x).powf(1.7)
}

/// Silicate attenuation with optical depth `tau_sil` at 9.7 µm.
pub fn s07_attenuation(x: f64, tau_sil: f64) -> f64 {
    if x <= 0.0 || tau_sil == 0.0 {
        return 1.0;
    }
    mixed_screen(tau_sil * kvt_profile(x))
}

/// Absorption feature with a Drude opacity profile and central depth `tau`.
pub fn att_drude(x: f64, tau: f64, x_0: f64, fwhm: f64) -> f64 {
    if x <= 0.0 || tau == 0.0 {
        return 1.0;
    }
    mixed_screen(tau * drude(x, 1.0, x_0, fwhm))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_and_drude_peak_at_center() {
        assert!((gaussian(12.8, 3.0, 12.8, 0.1) - 3.0).abs() < 1e-12);
        assert!((drude(6.22, 2.0, 6.22, 0.19) - 2.0).abs() < 1e-12);

        // Half maximum at x_0 ± fwhm/2 for the Gaussian.
        let half = gaussian(12.85, 1.0, 12.8, 0.1);
        assert!((half - 0.5).abs() < 1e-9, "got {half}");
    }

    #[test]
    fn blackbody_is_finite_and_non_negative_on_cold_short_wavelengths() {
        for &t in &[35.0, 300.0, 5000.0] {
            for &x in &[0.5, 1.0, 5.0, 30.0] {
                let v = blackbody(x, 1.0, t);
                assert!(v.is_finite() && v >= 0.0, "T={t} x={x} -> {v}");
            }
        }
        assert_eq!(blackbody(-1.0, 1.0, 300.0), 0.0);
    }

    #[test]
    fn blackbody_peaks_near_wien_wavelength() {
        // F_nu-like form peaks redward of 2898/T; check monotone decline far past it.
        let t = 300.0;
        assert!(blackbody(30.0, 1.0, t) < blackbody(15.0, 1.0, t));
        assert!(blackbody(1.0, 1.0, t) < blackbody(5.0, 1.0, t));
    }

    #[test]
    fn mixed_screen_limits() {
        assert!((mixed_screen(0.0) - 1.0).abs() < 1e-15);
        assert!((mixed_screen(1e-8) - 1.0).abs() < 1e-8);
        let big = mixed_screen(50.0);
        assert!((big - 1.0 / 50.0).abs() < 1e-12);
    }

    #[test]
    fn kvt_profile_peaks_near_ten_micron_and_is_continuous() {
        assert!((kvt_profile(9.75) - (0.9 + 0.1 * (9.7_f64 / 9.75).powf(1.7))).abs() < 1e-12);
        let below = kvt_profile(12.699_999);
        let above = kvt_profile(12.7);
        assert!((below - above).abs() < 1e-3, "{below} vs {above}");
        for x in [1.0, 5.0, 7.99, 8.0, 20.0, 30.0] {
            assert!(kvt_profile(x).is_finite());
        }
    }

    #[test]
    fn attenuation_is_unity_without_optical_depth() {
        assert_eq!(s07_attenuation(9.7, 0.0), 1.0);
        assert_eq!(att_drude(6.0, 0.0, 6.02, 0.3), 1.0);
        let a = s07_attenuation(9.7, 2.0);
        assert!(a > 0.0 && a < 1.0);
        let b = att_drude(6.02, 1.0, 6.02, 0.3);
        assert!((b - mixed_screen(1.0)).abs() < 1e-12);
    }
}
