//! Continuum integrals.

use specchart_core::{ContinuumType, Roi};

/// Counts contributed by the ROI's continuum between `x0` and `x1` keV.
///
/// Reversed limits give the negated integral. Polynomial continua are
/// floored at zero over each evaluated interval.
#[must_use]
pub fn offset_integral(roi: &Roi, x0: f64, x1: f64) -> f64 {
    if x1 < x0 {
        return -offset_integral(roi, x1, x0);
    }
    let value = match roi.continuum_type {
        ContinuumType::NoOffset => 0.0,
        ContinuumType::External => external_integral(
            &roi.continuum_energies,
            &roi.continuum_counts,
            x0,
            x1,
        ),
        ContinuumType::Constant
        | ContinuumType::Linear
        | ContinuumType::Quadratic
        | ContinuumType::Cubic => {
            polynomial_integral(&roi.coeffs, roi.reference_energy, x0, x1).max(0.0)
        }
    };
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Closed-form integral of `sum(c[i] * (x - reference)^i)` over `[x0, x1]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn polynomial_integral(coeffs: &[f64], reference: f64, x0: f64, x1: f64) -> f64 {
    let a = x0 - reference;
    let b = x1 - reference;
    coeffs
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let order = (i + 1) as i32;
            c / f64::from(order) * (b.powi(order) - a.powi(order))
        })
        .sum()
}

/// Integral over binned counts, weighting partially covered bins by the
/// covered fraction of their width.
///
/// `energies` holds lower bin edges; when it is as long as `counts` the last
/// bin's width is taken from its neighbour.
#[must_use]
pub fn external_integral(energies: &[f64], counts: &[f64], x0: f64, x1: f64) -> f64 {
    let n = counts.len();
    if n == 0 || energies.len() < n {
        return 0.0;
    }
    let upper_edge = |i: usize| -> f64 {
        if let Some(&e) = energies.get(i + 1) {
            e
        } else if i > 0 {
            energies[i] + (energies[i] - energies[i - 1])
        } else {
            energies[i] + 1.0
        }
    };

    let mut total = 0.0;
    let start = energies[..n].partition_point(|&e| e <= x0).saturating_sub(1);
    for i in start..n {
        let lo = energies[i];
        if lo >= x1 {
            break;
        }
        let hi = upper_edge(i);
        let width = hi - lo;
        if width <= 0.0 {
            continue;
        }
        let overlap = hi.min(x1) - lo.max(x0);
        if overlap > 0.0 {
            total += counts[i] * overlap / width;
        }
    }
    total
}
