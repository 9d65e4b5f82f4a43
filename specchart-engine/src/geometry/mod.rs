//! ROI/Peak Geometry Engine.
//!
//! Geometry is built in two steps. [`compute_roi_bins`] evaluates the
//! continuum and every peak over the display bins that overlap the ROI, in
//! counts. [`compute_roi_paths`] runs those numbers through the scales to get
//! the continuum line, stacked peak fills, per-peak outlines and label
//! anchors in plot pixels.

mod continuum;
mod labels;
mod peak;

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::{DisplayPoint, Peak, PeakType, Roi};

use crate::path::{Path, PixelPoint};
use crate::rebin::nearest_point;
use crate::scale::{LinearScale, YScale};

pub use continuum::{external_integral, offset_integral, polynomial_integral};
pub use labels::{place_labels, LabelMetrics, LabelRequest, PlacedLabel, Placement};
pub use peak::{erf, gaussian_fraction, peak_bin_counts};

/// Half-width, in sigmas, of the window drawn for each peak of a multi-peak
/// ROI.
pub const PEAK_WINDOW_SIGMAS: f64 = 5.0;

/// Pixel anchor for a peak label.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LabelAnchor {
    /// Index of the peak in the ROI's peak list.
    pub peak_index: usize,
    pub mean: f64,
    pub x_px: f64,
    /// Pixel y of the peak's baseline (continuum plus lower peaks).
    pub base_px: f64,
    /// Pixel y of the peak's summit.
    pub summit_px: f64,
}

/// Per-bin counts of a ROI, before pixel mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoiBins {
    /// Energy bounds of each bin, clipped to the ROI.
    pub edges: Vec<(f64, f64)>,
    /// Observed counts per bin.
    pub observed: Vec<f64>,
    /// Continuum counts per bin, scaled and background subtracted.
    pub continuum: Vec<f64>,
    /// Peak counts per bin, one row per peak in ascending mean order.
    pub peaks: Vec<Vec<f64>>,
    /// Index into `Roi::peaks` for each row of `peaks`.
    pub peak_order: Vec<usize>,
}

impl RoiBins {
    /// Index of the bin containing `energy`.
    #[must_use]
    pub fn bin_of(&self, energy: f64) -> Option<usize> {
        self.edges
            .iter()
            .position(|&(lo, hi)| energy >= lo && energy < hi)
            .or_else(|| {
                self.edges
                    .last()
                    .filter(|&&(_, hi)| (energy - hi).abs() < f64::EPSILON)
                    .map(|_| self.edges.len() - 1)
            })
    }

    /// Continuum plus every peak below row `row` in bin `bin`.
    #[must_use]
    pub fn stacked_base(&self, row: usize, bin: usize) -> f64 {
        self.continuum[bin] + self.peaks[..row].iter().map(|p| p[bin]).sum::<f64>()
    }
}

/// Pixel geometry of one ROI.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RoiPaths {
    pub continuum_path: Path,
    /// Closed fill polygons, one per peak in ascending mean order.
    pub peak_fill_paths: Vec<Path>,
    /// Continuum-plus-peak lines, one per peak in ascending mean order.
    pub peak_outline_paths: Vec<Path>,
    /// Index into `Roi::peaks` for each fill/outline.
    pub peak_order: Vec<usize>,
    /// `(top, bottom)` pixel extent of everything drawn for the ROI.
    pub vertical_px_range: (f64, f64),
    pub label_anchors: Vec<LabelAnchor>,
    pub lower_px: f64,
    pub upper_px: f64,
}

/// Energy window drawn for a peak.
///
/// A lone peak covers the whole ROI; in a multi-peak ROI each peak is
/// limited to `mean ± 5 sigma`.
#[must_use]
pub fn peak_window(roi: &Roi, peak: &Peak) -> (f64, f64) {
    if roi.peaks.len() <= 1 || peak.sigma <= 0.0 {
        return (roi.lower_energy, roi.upper_energy);
    }
    let half = PEAK_WINDOW_SIGMAS * peak.sigma;
    (
        (peak.mean - half).max(roi.lower_energy),
        (peak.mean + half).min(roi.upper_energy),
    )
}

/// Evaluates the continuum and peaks over the display bins overlapping the
/// ROI.
///
/// `points` are the display points the ROI is drawn over (already scaled by
/// `scale_factor`); `upper_edge` closes the last point. When `background` is
/// given its nearest point is subtracted from the continuum.
#[must_use]
pub fn compute_roi_bins(
    roi: &Roi,
    points: &[DisplayPoint],
    upper_edge: f64,
    scale_factor: f64,
    background: Option<&[DisplayPoint]>,
) -> RoiBins {
    let mut bins = RoiBins::default();
    let start = points
        .partition_point(|p| p.x <= roi.lower_energy)
        .saturating_sub(1);

    for (i, p) in points.iter().enumerate().skip(start) {
        if p.x >= roi.upper_energy {
            break;
        }
        let end = points.get(i + 1).map_or(upper_edge, |next| next.x);
        let width = end - p.x;
        let lo = p.x.max(roi.lower_energy);
        let hi = end.min(roi.upper_energy);
        if width <= 0.0 || hi <= lo {
            continue;
        }
        let fraction = (hi - lo) / width;
        let bg = background
            .and_then(|bg| nearest_point(bg, p.x).map(|j| bg[j].y))
            .unwrap_or(0.0);

        bins.edges.push((lo, hi));
        bins.observed.push(p.y * fraction);
        let continuum = offset_integral(roi, lo, hi) * scale_factor;
        bins.continuum.push((continuum - bg * fraction).max(0.0));
    }

    let mut order: Vec<usize> = (0..roi.peaks.len()).collect();
    order.sort_by(|&a, &b| roi.peaks[a].mean.total_cmp(&roi.peaks[b].mean));
    for &index in &order {
        let peak = &roi.peaks[index];
        let row = bins
            .edges
            .iter()
            .zip(bins.observed.iter().zip(&bins.continuum))
            .map(|(&(lo, hi), (&observed, &continuum))| {
                let counts = peak_bin_counts(peak, lo, hi, observed, continuum);
                if peak.peak_type == PeakType::GaussianDefined {
                    counts * scale_factor
                } else {
                    counts
                }
            })
            .collect();
        bins.peaks.push(row);
    }
    bins.peak_order = order;
    bins
}

fn push_step(path: &mut Path, x: &LinearScale, y: &YScale, lo: f64, hi: f64, value: f64) {
    let py = y.map(value);
    path.push(PixelPoint::new(x.map(lo), py));
    path.push(PixelPoint::new(x.map(hi), py));
}

/// Computes the pixel geometry of a ROI drawn over `points`.
#[must_use]
pub fn compute_roi_paths(
    roi: &Roi,
    points: &[DisplayPoint],
    upper_edge: f64,
    scale_factor: f64,
    background: Option<&[DisplayPoint]>,
    x: &LinearScale,
    y: &YScale,
) -> RoiPaths {
    let bins = compute_roi_bins(roi, points, upper_edge, scale_factor, background);
    paths_from_bins(roi, &bins, x, y)
}

/// Pixel geometry for precomputed bins.
#[must_use]
pub fn paths_from_bins(roi: &Roi, bins: &RoiBins, x: &LinearScale, y: &YScale) -> RoiPaths {
    let mut paths = RoiPaths {
        lower_px: x.map(roi.lower_energy),
        upper_px: x.map(roi.upper_energy),
        peak_order: bins.peak_order.clone(),
        ..RoiPaths::default()
    };

    for (bin, &(lo, hi)) in bins.edges.iter().enumerate() {
        push_step(&mut paths.continuum_path, x, y, lo, hi, bins.continuum[bin]);
    }

    for (row, &peak_index) in bins.peak_order.iter().enumerate() {
        let peak = &roi.peaks[peak_index];
        let (w_lo, w_hi) = peak_window(roi, peak);
        let in_window: Vec<usize> = bins
            .edges
            .iter()
            .enumerate()
            .filter(|(_, &(lo, hi))| hi > w_lo && lo < w_hi)
            .map(|(i, _)| i)
            .collect();

        let mut fill = Path::with_capacity(in_window.len() * 4);
        let mut outline = Path::with_capacity(in_window.len() * 2);
        for &bin in &in_window {
            let (lo, hi) = bins.edges[bin];
            push_step(&mut fill, x, y, lo, hi, bins.stacked_base(row, bin));
            push_step(
                &mut outline,
                x,
                y,
                lo,
                hi,
                bins.continuum[bin] + bins.peaks[row][bin],
            );
        }
        for &bin in in_window.iter().rev() {
            let (lo, hi) = bins.edges[bin];
            let top = bins.stacked_base(row, bin) + bins.peaks[row][bin];
            let py = y.map(top);
            fill.push(PixelPoint::new(x.map(hi), py));
            fill.push(PixelPoint::new(x.map(lo), py));
        }

        if let Some(bin) = bins.bin_of(peak.mean) {
            let base = bins.stacked_base(row, bin);
            paths.label_anchors.push(LabelAnchor {
                peak_index,
                mean: peak.mean,
                x_px: x.map(peak.mean),
                base_px: y.map(base),
                summit_px: y.map(base + bins.peaks[row][bin]),
            });
        }
        paths.peak_fill_paths.push(fill);
        paths.peak_outline_paths.push(outline);
    }

    let (top, bottom) = paths
        .continuum_path
        .iter()
        .chain(paths.peak_fill_paths.iter().flatten())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(t, b), p| {
            (t.min(p.y), b.max(p.y))
        });
    paths.vertical_px_range = if top.is_finite() {
        (top, bottom)
    } else {
        (0.0, 0.0)
    };
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use specchart_core::{ContinuumType, YScaleMode};

    #[allow(clippy::cast_precision_loss)]
    fn unit_points(n: usize, value: f64) -> Vec<DisplayPoint> {
        (0..n).map(|i| DisplayPoint::new(i as f64, value)).collect()
    }

    fn scales() -> (LinearScale, YScale) {
        (
            LinearScale::new((0.0, 100.0), (0.0, 100.0)),
            YScale::new(YScaleMode::Linear, (0.0, 100.0), 100.0),
        )
    }

    #[test]
    fn test_bins_clip_to_roi() {
        let roi = Roi::polynomial(ContinuumType::Constant, 2.5, 5.0, vec![4.0]);
        let bins = compute_roi_bins(&roi, &unit_points(10, 8.0), 10.0, 1.0, None);
        assert_eq!(bins.edges.first(), Some(&(2.5, 3.0)));
        assert_eq!(bins.edges.last(), Some(&(4.0, 5.0)));
        assert_relative_eq!(bins.observed[0], 4.0);
        assert_relative_eq!(bins.continuum[0], 2.0);
    }

    #[test]
    fn test_peaks_stack_in_mean_order() {
        let roi = Roi::polynomial(ContinuumType::Constant, 0.0, 40.0, vec![1.0])
            .with_peak(Peak::gaussian(25.0, 2.0, 50.0))
            .with_peak(Peak::gaussian(15.0, 2.0, 50.0));
        let bins = compute_roi_bins(&roi, &unit_points(40, 0.0), 40.0, 1.0, None);
        assert_eq!(bins.peak_order, vec![1, 0]);
        let bin = bins.bin_of(25.0).unwrap_or(0);
        assert_relative_eq!(
            bins.stacked_base(1, bin),
            bins.continuum[bin] + bins.peaks[0][bin]
        );
    }

    #[test]
    fn test_multi_peak_window_limits_fill() {
        let roi = Roi::polynomial(ContinuumType::Constant, 0.0, 100.0, vec![1.0])
            .with_peak(Peak::gaussian(20.0, 1.0, 10.0))
            .with_peak(Peak::gaussian(80.0, 1.0, 10.0));
        let (x, y) = scales();
        let paths = compute_roi_paths(&roi, &unit_points(100, 0.0), 100.0, 1.0, None, &x, &y);
        let first = &paths.peak_fill_paths[0];
        assert!(first.iter().all(|p| p.x >= 15.0 && p.x <= 25.0));
        assert_eq!(paths.label_anchors.len(), 2);
        assert_relative_eq!(paths.lower_px, 0.0);
        assert_relative_eq!(paths.upper_px, 100.0);

        let single = Roi::polynomial(ContinuumType::Constant, 0.0, 100.0, vec![1.0])
            .with_peak(Peak::gaussian(20.0, 1.0, 10.0));
        let paths = compute_roi_paths(&single, &unit_points(100, 0.0), 100.0, 1.0, None, &x, &y);
        assert_relative_eq!(paths.peak_fill_paths[0][0].x, 0.0);
    }

    #[test]
    fn test_background_is_subtracted_from_continuum() {
        let roi = Roi::polynomial(ContinuumType::Constant, 0.0, 4.0, vec![5.0]);
        let bg = unit_points(4, 2.0);
        let bins = compute_roi_bins(&roi, &unit_points(4, 0.0), 4.0, 1.0, Some(&bg));
        assert!(bins.continuum.iter().all(|&c| (c - 3.0).abs() < 1e-12));
    }

    #[test]
    fn test_vertical_range_spans_summit_and_continuum() {
        let roi = Roi::polynomial(ContinuumType::Constant, 0.0, 100.0, vec![10.0])
            .with_peak(Peak::gaussian(50.0, 5.0, 200.0));
        let (x, y) = scales();
        let paths = compute_roi_paths(&roi, &unit_points(100, 0.0), 100.0, 1.0, None, &x, &y);
        let (top, bottom) = paths.vertical_px_range;
        assert!(top < bottom);
        assert_relative_eq!(bottom, 90.0, epsilon = 1e-9);
        let anchor = paths.label_anchors[0];
        assert!(anchor.summit_px < anchor.base_px);
    }
}
