//! Scale-factor sliders for background and secondary spectra.

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::SpectrumType;

/// Inset of the slider track from the top and bottom of the plot.
const TRACK_INSET_PX: f64 = 10.0;
/// Horizontal distance between slider columns.
const COLUMN_SPACING_PX: f64 = 18.0;
/// Distance of the first column from the right edge of the plot.
const RIGHT_MARGIN_PX: f64 = 12.0;
/// Pointer distance that grabs a slider.
const GRAB_PX: f64 = 6.0;

/// One vertical slider in plot-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ScalerSlider {
    pub spectrum_type: SpectrumType,
    pub factor: f64,
    /// Factor at the top of the track.
    pub max_factor: f64,
    pub x_px: f64,
    pub track_top: f64,
    pub track_bottom: f64,
    pub handle_y: f64,
}

impl ScalerSlider {
    /// Factor under pixel row `y`, clamped to `[0, max_factor]`.
    #[must_use]
    pub fn factor_at(&self, y: f64) -> f64 {
        let len = self.track_bottom - self.track_top;
        if len <= 0.0 {
            return self.factor;
        }
        ((self.track_bottom - y) / len * self.max_factor).clamp(0.0, self.max_factor)
    }

    /// Whether a press at plot-local `(x, y)` grabs this slider.
    #[must_use]
    pub fn hit(&self, x: f64, y: f64) -> bool {
        (x - self.x_px).abs() <= GRAB_PX
            && y >= self.track_top - GRAB_PX
            && y <= self.track_bottom + GRAB_PX
    }
}

/// Lays out one slider per entry of `(type, factor, max)`, right to left.
#[must_use]
pub fn layout_sliders(
    entries: &[(SpectrumType, f64, f64)],
    plot_width: f64,
    plot_height: f64,
) -> Vec<ScalerSlider> {
    let track_top = TRACK_INSET_PX;
    let track_bottom = (plot_height - TRACK_INSET_PX).max(track_top);
    entries
        .iter()
        .enumerate()
        .map(|(i, &(spectrum_type, factor, max_factor))| {
            let max_factor = max_factor.max(factor).max(f64::MIN_POSITIVE);
            let column = f64::from(u32::try_from(i).unwrap_or(u32::MAX));
            let t = (factor / max_factor).clamp(0.0, 1.0);
            ScalerSlider {
                spectrum_type,
                factor,
                max_factor,
                x_px: plot_width - RIGHT_MARGIN_PX - column * COLUMN_SPACING_PX,
                track_top,
                track_bottom,
                handle_y: track_bottom - t * (track_bottom - track_top),
            }
        })
        .collect()
}
