//! Peak shape integrals.

use std::f64::consts::SQRT_2;

use specchart_core::{Peak, PeakType};

/// Error function, Abramowitz & Stegun 7.1.26 (|error| <= 1.5e-7).
#[must_use]
pub fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;
    sign * (1.0 - poly * (-x * x).exp())
}

/// Fraction of a unit-area Gaussian between `x0` and `x1`.
#[must_use]
pub fn gaussian_fraction(mean: f64, sigma: f64, x0: f64, x1: f64) -> f64 {
    if sigma <= 0.0 {
        return if x0 <= mean && mean < x1 { 1.0 } else { 0.0 };
    }
    let scale = sigma * SQRT_2;
    0.5 * (erf((x1 - mean) / scale) - erf((x0 - mean) / scale))
}

/// Counts the peak contributes to the bin `[x0, x1)`.
///
/// Gaussian peaks integrate their shape; data-defined peaks take whatever
/// the observed counts show above the continuum.
#[must_use]
pub fn peak_bin_counts(peak: &Peak, x0: f64, x1: f64, observed: f64, continuum: f64) -> f64 {
    match peak.peak_type {
        PeakType::GaussianDefined => peak.amplitude * gaussian_fraction(peak.mean, peak.sigma, x0, x1),
        PeakType::DataDefined => (observed - continuum).max(0.0),
    }
}
