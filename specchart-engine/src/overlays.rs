//! Reference gamma lines, search windows, and highlight regions.

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::{Color, HighlightRegion, ReferenceLineSet, SearchWindow};

use crate::scale::LinearScale;

/// Pointer distance within which a reference line counts as hovered.
pub const REFERENCE_HOVER_PX: f64 = 10.0;

/// One vertical reference line in plot-local pixels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ReferenceLineGeometry {
    pub set_index: usize,
    pub line_index: usize,
    pub energy: f64,
    pub x_px: f64,
    /// Top of the line; the bottom is the x axis.
    pub top_px: f64,
    pub color: Color,
}

/// Builds vertical segments for every reference line inside the domain.
///
/// Each line rises from the axis by `h / max(h)` of the plot height.
#[must_use]
pub fn reference_line_geometry(
    sets: &[ReferenceLineSet],
    x: &LinearScale,
    plot_height: f64,
) -> Vec<ReferenceLineGeometry> {
    let (lo, hi) = x.domain();
    let mut out = Vec::new();
    for (set_index, set) in sets.iter().enumerate() {
        let max = set.max_amplitude();
        for (line_index, line) in set.lines.iter().enumerate() {
            if line.energy < lo || line.energy > hi {
                continue;
            }
            let fraction = (line.amplitude / max).clamp(0.0, 1.0);
            out.push(ReferenceLineGeometry {
                set_index,
                line_index,
                energy: line.energy,
                x_px: x.map(line.energy),
                top_px: plot_height * (1.0 - fraction),
                color: set.color,
            });
        }
    }
    out
}

/// Index of the line nearest to `x_px`, if within [`REFERENCE_HOVER_PX`].
#[must_use]
pub fn hovered_reference_line(lines: &[ReferenceLineGeometry], x_px: f64) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| (i, (l.x_px - x_px).abs()))
        .filter(|&(_, d)| d <= REFERENCE_HOVER_PX)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// A filled band spanning the full plot height.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ShadedBand {
    pub lower_energy: f64,
    pub upper_energy: f64,
    pub x0_px: f64,
    pub x1_px: f64,
    pub fill: Option<Color>,
}

fn band(bounds: (f64, f64), fill: Option<Color>, x: &LinearScale) -> Option<ShadedBand> {
    let (lo, hi) = x.domain();
    if !bounds.0.is_finite() || !bounds.1.is_finite() || bounds.1 < lo || bounds.0 > hi {
        return None;
    }
    let width = x.pixel_span();
    Some(ShadedBand {
        lower_energy: bounds.0,
        upper_energy: bounds.1,
        x0_px: x.map(bounds.0).clamp(0.0, width),
        x1_px: x.map(bounds.1).clamp(0.0, width),
        fill,
    })
}

/// Bands for search windows (`energy ± window`) in view.
#[must_use]
pub fn search_window_bands(windows: &[SearchWindow], x: &LinearScale) -> Vec<ShadedBand> {
    windows
        .iter()
        .filter_map(|w| band(w.bounds(), w.fill, x))
        .collect()
}

/// Bands for highlight regions in view.
#[must_use]
pub fn highlight_bands(regions: &[HighlightRegion], x: &LinearScale) -> Vec<ShadedBand> {
    regions
        .iter()
        .filter_map(|r| band(r.bounds(), r.fill, x))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use specchart_core::ReferenceLine;

    fn cs137() -> ReferenceLineSet {
        ReferenceLineSet {
            parent: "Cs137".to_string(),
            lines: vec![ReferenceLine::new(661.657, 85.1), ReferenceLine::new(32.0, 42.55)],
            ..ReferenceLineSet::default()
        }
    }

    #[test]
    fn test_line_heights_scale_with_amplitude() {
        let x = LinearScale::new((0.0, 1000.0), (0.0, 1000.0));
        let lines = reference_line_geometry(&[cs137()], &x, 200.0);
        assert_eq!(lines.len(), 2);
        assert_relative_eq!(lines[0].top_px, 0.0);
        assert_relative_eq!(lines[1].top_px, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lines_outside_domain_skipped_and_hover() {
        let x = LinearScale::new((100.0, 1000.0), (0.0, 900.0));
        let lines = reference_line_geometry(&[cs137()], &x, 200.0);
        assert_eq!(lines.len(), 1);
        assert_eq!(hovered_reference_line(&lines, 565.0), Some(0));
        assert_eq!(hovered_reference_line(&lines, 500.0), None);
    }

    #[test]
    fn test_bands_clip_to_plot() {
        let x = LinearScale::new((0.0, 100.0), (0.0, 100.0));
        let windows = [SearchWindow {
            energy: 95.0,
            window: 10.0,
            fill: None,
        }];
        let bands = search_window_bands(&windows, &x);
        assert_relative_eq!(bands[0].x0_px, 85.0);
        assert_relative_eq!(bands[0].x1_px, 100.0);
        let regions = [HighlightRegion {
            lower_energy: 200.0,
            upper_energy: 300.0,
            fill: None,
        }];
        assert!(highlight_bands(&regions, &x).is_empty());
    }
}
