//! Spectrum data model.
//!
//! A [`Spectrum`] is an energy-vs-counts histogram as handed over by the
//! host. Channel `i` spans `[x[i], x[i + 1])`; when the energy array has the
//! same length as the counts, the last channel's width is extrapolated from
//! its neighbour.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::roi::Roi;
use crate::{Color, Error, Result};

/// Role a spectrum plays in the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum SpectrumType {
    #[default]
    Foreground,
    Background,
    Secondary,
}

impl SpectrumType {
    /// Name used in host events.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Foreground => "FOREGROUND",
            Self::Background => "BACKGROUND",
            Self::Secondary => "SECONDARY",
        }
    }
}

impl std::fmt::Display for SpectrumType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rebinned `(energy, counts)` pair used for rendering.
///
/// `x` is the lower energy of the first raw channel in the group and `y` is
/// the summed counts of the group multiplied by the spectrum's scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
}

impl DisplayPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Host-supplied spectrum.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Spectrum {
    /// Host identifier, used to link a background via `background_id`.
    pub id: Option<String>,
    pub spectrum_type: SpectrumType,
    pub title: String,
    /// Channel lower-edge energies (keV), non-decreasing.
    pub x: Vec<f64>,
    /// Counts per channel; same length as `x` or one shorter.
    pub y: Vec<f64>,
    pub y_scale_factor: f64,
    pub background_id: Option<String>,
    pub rois: Vec<Roi>,
    pub line_color: Option<Color>,
    pub peak_color: Option<Color>,
    pub live_time: Option<f64>,
    pub real_time: Option<f64>,
    pub neutrons: Option<f64>,
}

impl Default for Spectrum {
    fn default() -> Self {
        Self {
            id: None,
            spectrum_type: SpectrumType::Foreground,
            title: String::new(),
            x: Vec::new(),
            y: Vec::new(),
            y_scale_factor: 1.0,
            background_id: None,
            rois: Vec::new(),
            line_color: None,
            peak_color: None,
            live_time: None,
            real_time: None,
            neutrons: None,
        }
    }
}

impl Spectrum {
    /// Creates a spectrum from channel energies and counts.
    #[must_use]
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Creates a spectrum with `n` channels of unit width starting at zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_counts(counts: Vec<f64>) -> Self {
        let x = (0..counts.len()).map(|i| i as f64).collect();
        Self::new(x, counts)
    }

    /// Sets the spectrum type.
    #[must_use]
    pub fn with_type(mut self, spectrum_type: SpectrumType) -> Self {
        self.spectrum_type = spectrum_type;
        self
    }

    /// Sets the host identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the y scale factor.
    #[must_use]
    pub fn with_scale_factor(mut self, factor: f64) -> Self {
        self.y_scale_factor = factor;
        self
    }

    /// Sets the ROIs drawn on top of this spectrum.
    #[must_use]
    pub fn with_rois(mut self, rois: Vec<Roi>) -> Self {
        self.rois = rois;
        self
    }

    /// Checks the structural invariants of the spectrum.
    ///
    /// # Errors
    ///
    /// Returns an error if the spectrum is empty, the arrays have
    /// incompatible lengths, energies decrease or are not finite, a count
    /// is not finite, or the scale factor is negative.
    pub fn validate(&self) -> Result<()> {
        if self.x.is_empty() || self.y.is_empty() {
            return Err(Error::EmptySpectrum);
        }
        if self.y.len() != self.x.len() && self.y.len() + 1 != self.x.len() {
            return Err(Error::LengthMismatch {
                x: self.x.len(),
                y: self.y.len(),
            });
        }
        for (index, pair) in self.x.windows(2).enumerate() {
            if !pair[0].is_finite() || pair[1] < pair[0] {
                return Err(Error::NonMonotonicEnergies { index: index + 1 });
            }
        }
        if self.x.last().is_some_and(|e| !e.is_finite()) {
            return Err(Error::NonMonotonicEnergies {
                index: self.x.len() - 1,
            });
        }
        if let Some(index) = self.y.iter().position(|c| !c.is_finite()) {
            return Err(Error::NonFiniteCounts { index });
        }
        if !self.y_scale_factor.is_finite() || self.y_scale_factor < 0.0 {
            return Err(Error::InvalidScaleFactor(self.y_scale_factor));
        }
        Ok(())
    }

    /// Number of channels (length of the counts array).
    #[must_use]
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.y.len()
    }

    /// Lower edge energy of channel `index`.
    #[must_use]
    #[inline]
    pub fn channel_lower_energy(&self, index: usize) -> f64 {
        self.x.get(index).copied().unwrap_or_else(|| self.upper_energy())
    }

    /// Upper edge energy of channel `index`.
    #[must_use]
    pub fn channel_upper_energy(&self, index: usize) -> f64 {
        if let Some(&next) = self.x.get(index + 1) {
            return next;
        }
        let n = self.x.len();
        match n {
            0 => 0.0,
            1 => self.x[0] + 1.0,
            _ => {
                let last = index.min(n - 1);
                let width = self.x[n - 1] - self.x[n - 2];
                self.x[last] + width
            }
        }
    }

    /// Lowest energy covered by the data.
    #[must_use]
    pub fn lower_energy(&self) -> f64 {
        self.x.first().copied().unwrap_or(0.0)
    }

    /// Highest energy covered by the data (upper edge of the last channel).
    #[must_use]
    pub fn upper_energy(&self) -> f64 {
        match self.y.len() {
            0 => self.lower_energy(),
            n => self.channel_upper_energy(n - 1),
        }
    }

    /// Index of the channel containing `energy`, clamped to the valid range.
    ///
    /// Uses a binary search over the monotonic energy array.
    #[must_use]
    pub fn find_channel(&self, energy: f64) -> usize {
        let n = self.y.len();
        if n == 0 {
            return 0;
        }
        let above = self.x[..n].partition_point(|&e| e <= energy);
        above.saturating_sub(1).min(n - 1)
    }

    /// Raw counts in the channel containing `energy` (unscaled).
    #[must_use]
    pub fn counts_at(&self, energy: f64) -> f64 {
        if self.y.is_empty() {
            return 0.0;
        }
        self.y[self.find_channel(energy)]
    }

    /// Sum of all counts (unscaled).
    #[must_use]
    pub fn total_counts(&self) -> f64 {
        self.y.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Spectrum {
        Spectrum::from_counts(vec![1.0; n])
    }

    #[test]
    fn test_validate_accepts_both_length_conventions() {
        assert!(ramp(10).validate().is_ok());
        let edges = Spectrum::new(vec![0.0, 1.0, 2.0], vec![5.0, 6.0]);
        assert!(edges.validate().is_ok());
        assert!((edges.upper_energy() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert_eq!(Spectrum::default().validate(), Err(Error::EmptySpectrum));
        let short = Spectrum::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0]);
        assert!(matches!(
            short.validate(),
            Err(Error::LengthMismatch { x: 4, y: 1 })
        ));
        let backwards = Spectrum::new(vec![0.0, 2.0, 1.0], vec![1.0; 3]);
        assert_eq!(
            backwards.validate(),
            Err(Error::NonMonotonicEnergies { index: 2 })
        );
        let mut holes = ramp(5);
        holes.y[3] = f64::NAN;
        assert_eq!(holes.validate(), Err(Error::NonFiniteCounts { index: 3 }));
        holes.y[3] = f64::INFINITY;
        assert_eq!(holes.validate(), Err(Error::NonFiniteCounts { index: 3 }));
        let scaled = ramp(3).with_scale_factor(-1.0);
        assert!(matches!(
            scaled.validate(),
            Err(Error::InvalidScaleFactor(_))
        ));
    }

    #[test]
    fn test_find_channel_clamps() {
        let s = ramp(10);
        assert_eq!(s.find_channel(-5.0), 0);
        assert_eq!(s.find_channel(0.0), 0);
        assert_eq!(s.find_channel(3.5), 3);
        assert_eq!(s.find_channel(4.0), 4);
        assert_eq!(s.find_channel(100.0), 9);
    }

    #[test]
    fn test_channel_edges() {
        let s = Spectrum::new(vec![0.0, 2.0, 4.0], vec![1.0, 2.0, 3.0]);
        assert!((s.channel_upper_energy(0) - 2.0).abs() < f64::EPSILON);
        assert!((s.channel_upper_energy(2) - 6.0).abs() < f64::EPSILON);
        assert!((s.upper_energy() - 6.0).abs() < f64::EPSILON);
        assert!((s.total_counts() - 6.0).abs() < f64::EPSILON);
    }
}
