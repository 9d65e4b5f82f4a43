//! Read-only overlay data: reference gamma lines, search windows, and
//! highlighted energy regions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Color, Error, Result};

/// A single reference line.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReferenceLine {
    /// Line energy in keV.
    pub energy: f64,
    /// Relative amplitude; normalised against the largest line in the set.
    pub amplitude: f64,
    pub particle: String,
    pub decay: String,
    pub element: String,
}

impl ReferenceLine {
    #[must_use]
    pub fn new(energy: f64, amplitude: f64) -> Self {
        Self {
            energy,
            amplitude,
            particle: "gamma".to_string(),
            ..Self::default()
        }
    }
}

/// A group of reference lines sharing a source and a color.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReferenceLineSet {
    /// Source name, e.g. "Cs137".
    pub parent: String,
    pub color: Color,
    pub lines: Vec<ReferenceLine>,
    pub detector: Option<String>,
    pub shielding: Option<String>,
    pub shielding_thickness: Option<f64>,
}

impl ReferenceLineSet {
    /// Largest line amplitude in the set (at least a tiny positive value).
    #[must_use]
    pub fn max_amplitude(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.amplitude)
            .fold(f64::MIN_POSITIVE, f64::max)
    }

    /// Checks that every line is numeric.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidReferenceLine`] naming the first bad line.
    pub fn validate(&self) -> Result<()> {
        for (i, line) in self.lines.iter().enumerate() {
            if !line.energy.is_finite() || !line.amplitude.is_finite() || line.amplitude < 0.0 {
                return Err(Error::InvalidReferenceLine(format!(
                    "{} line {i}: energy {}, amplitude {}",
                    self.parent, line.energy, line.amplitude
                )));
            }
        }
        if self.shielding_thickness.is_some_and(|t| !t.is_finite()) {
            return Err(Error::InvalidReferenceLine(format!(
                "{}: non-finite shielding thickness",
                self.parent
            )));
        }
        Ok(())
    }
}

/// Energy window searched around a line, drawn as a shaded band.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchWindow {
    pub energy: f64,
    /// Half-width of the window in keV.
    pub window: f64,
    pub fill: Option<Color>,
}

impl SearchWindow {
    /// Energy bounds of the window.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        let half = self.window.abs();
        (self.energy - half, self.energy + half)
    }
}

/// Arbitrary energy range highlighted by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HighlightRegion {
    pub lower_energy: f64,
    pub upper_energy: f64,
    pub fill: Option<Color>,
}

impl HighlightRegion {
    /// Energy bounds, ordered.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        if self.lower_energy <= self.upper_energy {
            (self.lower_energy, self.upper_energy)
        } else {
            (self.upper_energy, self.lower_energy)
        }
    }
}
