//! Feature markers derived from the pointer energy.

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::MarkerOptions;

use crate::scale::LinearScale;

/// Electron rest energy in keV.
pub const ELECTRON_MASS_KEV: f64 = 510.998_950;
/// Energy lost by a single-escape peak.
pub const SINGLE_ESCAPE_KEV: f64 = 510.999;
/// Energy lost by a double-escape peak.
pub const DOUBLE_ESCAPE_KEV: f64 = 1021.998;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum MarkerKind {
    ComptonEdge,
    ComptonPeak,
    SingleEscape,
    DoubleEscape,
    /// Sum of the anchor energy and the pointer energy.
    SumPeak,
    /// Pointer energy minus the anchor energy.
    LeftSum,
}

impl MarkerKind {
    /// Short label shown next to the marker line.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ComptonEdge => "Compton Edge",
            Self::ComptonPeak => "Compton Peak",
            Self::SingleEscape => "Single Escape",
            Self::DoubleEscape => "Double Escape",
            Self::SumPeak => "Sum Peak",
            Self::LeftSum => "Left Sum Peak",
        }
    }
}

/// A vertical marker line.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct FeatureMarker {
    pub kind: MarkerKind,
    pub energy: f64,
    pub x_px: f64,
}

/// Compton edge of a gamma of `energy` keV.
#[must_use]
pub fn compton_edge(energy: f64) -> f64 {
    energy - energy / (1.0 + 2.0 * energy / ELECTRON_MASS_KEV)
}

/// Energy of a gamma of `energy` keV after scattering through `angle_deg`.
#[must_use]
pub fn compton_peak(energy: f64, angle_deg: f64) -> f64 {
    let cos = angle_deg.to_radians().cos();
    energy / (1.0 + (energy / ELECTRON_MASS_KEV) * (1.0 - cos))
}

/// Single-escape energy, if positive.
#[must_use]
pub fn single_escape(energy: f64) -> Option<f64> {
    Some(energy - SINGLE_ESCAPE_KEV).filter(|e| *e > 0.0)
}

/// Double-escape energy, if positive.
#[must_use]
pub fn double_escape(energy: f64) -> Option<f64> {
    Some(energy - DOUBLE_ESCAPE_KEV).filter(|e| *e > 0.0)
}

/// Markers for the pointer at `energy`, limited to the visible domain.
///
/// `sum_anchor` is the energy recorded by the last left click while the
/// sum-peak marker was enabled.
#[must_use]
pub fn feature_markers(
    energy: f64,
    sum_anchor: Option<f64>,
    options: &MarkerOptions,
    x: &LinearScale,
) -> Vec<FeatureMarker> {
    let mut candidates: Vec<(MarkerKind, Option<f64>)> = Vec::new();
    if options.compton_edge {
        candidates.push((MarkerKind::ComptonEdge, Some(compton_edge(energy))));
    }
    if options.compton_peak {
        candidates.push((
            MarkerKind::ComptonPeak,
            Some(compton_peak(energy, options.compton_peak_angle_deg)),
        ));
    }
    if options.escape_peaks {
        candidates.push((MarkerKind::SingleEscape, single_escape(energy)));
        candidates.push((MarkerKind::DoubleEscape, double_escape(energy)));
    }
    if options.sum_peak {
        if let Some(anchor) = sum_anchor {
            candidates.push((MarkerKind::SumPeak, Some(anchor + energy)));
            candidates.push((
                MarkerKind::LeftSum,
                Some(energy - anchor).filter(|e| *e > 0.0),
            ));
        }
    }

    let (lo, hi) = x.domain();
    candidates
        .into_iter()
        .filter_map(|(kind, e)| e.map(|e| (kind, e)))
        .filter(|&(_, e)| e.is_finite() && e >= lo && e <= hi)
        .map(|(kind, energy)| FeatureMarker {
            kind,
            energy,
            x_px: x.map(energy),
        })
        .collect()
}
