//! Rebinning Engine.
//!
//! Merges adjacent raw channels so that the number of display points is
//! bounded by the plot width instead of the channel count. Results are cached
//! per spectrum in a [`RebinState`] keyed on the raw index range and bin
//! factor.

use specchart_core::{DisplayPoint, Spectrum};

/// Cache key for a rebin result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RebinKey {
    /// First raw channel covering the visible domain.
    pub first_raw: usize,
    /// One past the last raw channel covering the visible domain.
    pub last_raw: usize,
    pub bin_factor: usize,
}

/// Cached display points of one spectrum.
#[derive(Debug, Clone, Default)]
pub struct RebinState {
    key: Option<RebinKey>,
    scale_factor: f64,
    /// Snapped raw range actually summed, including the lookback group.
    range: (usize, usize),
    points: Vec<DisplayPoint>,
    upper_edge: f64,
    computations: usize,
}

impl RebinState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the cached result; the next [`rebin`] recomputes.
    pub fn invalidate(&mut self) {
        self.key = None;
    }

    #[must_use]
    pub fn key(&self) -> Option<RebinKey> {
        self.key
    }

    /// Current bin factor, 1 before the first rebin.
    #[must_use]
    pub fn bin_factor(&self) -> usize {
        self.key.map_or(1, |k| k.bin_factor)
    }

    #[must_use]
    pub fn points(&self) -> &[DisplayPoint] {
        &self.points
    }

    /// Raw channel range `[first, last)` summed into [`points`](Self::points).
    #[must_use]
    pub fn raw_range(&self) -> (usize, usize) {
        self.range
    }

    /// Upper energy edge of the last display point.
    #[must_use]
    pub fn upper_edge(&self) -> f64 {
        self.upper_edge
    }

    /// Number of times points were actually recomputed.
    #[must_use]
    pub fn computations(&self) -> usize {
        self.computations
    }
}

/// Raw index range `[first, last)` of channels overlapping `[x_min, x_max]`.
///
/// Always contains at least one channel for a non-empty spectrum.
#[must_use]
pub fn visible_raw_range(spectrum: &Spectrum, x_min: f64, x_max: f64) -> (usize, usize) {
    let n = spectrum.num_channels();
    if n == 0 {
        return (0, 0);
    }
    let first = spectrum.find_channel(x_min);
    let last = spectrum.x[..n].partition_point(|&e| e < x_max).max(first + 1);
    (first, last.min(n))
}

/// Number of raw channels merged into one display point.
#[must_use]
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn bin_factor(first_raw: usize, last_raw: usize, pixel_width: f64, line_width_px: f64) -> usize {
    let channels = last_raw.saturating_sub(first_raw) as f64;
    if pixel_width.is_nan() || pixel_width <= 0.0 || !line_width_px.is_finite() {
        return 1;
    }
    let factor = (line_width_px * channels / pixel_width).ceil();
    if factor.is_finite() && factor >= 1.0 {
        factor as usize
    } else {
        1
    }
}

/// Snaps `[first, last)` outward to multiples of `factor`, adds one lookback
/// group below, and clamps to `n` channels.
#[must_use]
pub fn snapped_range(first: usize, last: usize, factor: usize, n: usize) -> (usize, usize) {
    let factor = factor.max(1);
    let lo = (first / factor) * factor;
    let hi = last.div_ceil(factor) * factor;
    (lo.saturating_sub(factor), hi.min(n))
}

/// Sums channels `[first, last)` in groups of `factor`.
///
/// Each point sits at the lower energy of its first channel; the final group
/// may be shorter when it hits the end of the data.
#[must_use]
pub fn group_points(
    spectrum: &Spectrum,
    first: usize,
    last: usize,
    factor: usize,
    scale_factor: f64,
) -> Vec<DisplayPoint> {
    let last = last.min(spectrum.num_channels());
    if first >= last {
        return Vec::new();
    }
    spectrum.y[first..last]
        .chunks(factor.max(1))
        .zip((first..last).step_by(factor.max(1)))
        .map(|(counts, start)| {
            let sum: f64 = counts.iter().sum();
            DisplayPoint::new(spectrum.x[start], sum * scale_factor)
        })
        .collect()
}

/// Brings the cached display points of `spectrum` up to date for the visible
/// domain.
///
/// Returns `true` when the points were recomputed and `false` on a cache hit.
pub fn rebin(
    spectrum: &Spectrum,
    x_domain: (f64, f64),
    pixel_width: f64,
    line_width_px: f64,
    state: &mut RebinState,
) -> bool {
    let n = spectrum.num_channels();
    let (first_raw, last_raw) = visible_raw_range(spectrum, x_domain.0, x_domain.1);
    let key = RebinKey {
        first_raw,
        last_raw,
        bin_factor: bin_factor(first_raw, last_raw, pixel_width, line_width_px),
    };

    #[allow(clippy::float_cmp)]
    let same_scale = state.scale_factor == spectrum.y_scale_factor;
    if state.key == Some(key) && same_scale {
        return false;
    }

    let (lo, hi) = snapped_range(first_raw, last_raw, key.bin_factor, n);
    state.points = group_points(spectrum, lo, hi, key.bin_factor, spectrum.y_scale_factor);
    state.range = (lo, hi);
    state.upper_edge = if hi > 0 {
        spectrum.channel_upper_energy(hi - 1)
    } else {
        spectrum.lower_energy()
    };
    state.key = Some(key);
    state.scale_factor = spectrum.y_scale_factor;
    state.computations += 1;
    log::debug!(
        "rebinned {} channels [{lo}, {hi}) by {} into {} points",
        spectrum.spectrum_type,
        key.bin_factor,
        state.points.len()
    );
    true
}

/// Index of the point whose energy is nearest to `x`.
#[must_use]
pub fn nearest_point(points: &[DisplayPoint], x: f64) -> Option<usize> {
    if points.is_empty() {
        return None;
    }
    let above = points.partition_point(|p| p.x < x);
    if above == 0 {
        return Some(0);
    }
    if above == points.len() {
        return Some(points.len() - 1);
    }
    if (points[above].x - x).abs() < (x - points[above - 1].x).abs() {
        Some(above)
    } else {
        Some(above - 1)
    }
}

/// Subtracts the nearest background point from each foreground point,
/// flooring the result at zero.
#[must_use]
pub fn background_subtract(
    foreground: &[DisplayPoint],
    background: &[DisplayPoint],
) -> Vec<DisplayPoint> {
    if background.is_empty() {
        return foreground.to_vec();
    }
    foreground
        .iter()
        .map(|p| {
            let bg = nearest_point(background, p.x).map_or(0.0, |i| background[i].y);
            DisplayPoint::new(p.x, (p.y - bg).max(0.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat(n: usize) -> Spectrum {
        Spectrum::from_counts(vec![1.0; n])
    }

    #[test]
    fn test_bin_factor() {
        assert_eq!(bin_factor(0, 1000, 500.0, 1.0), 2);
        assert_eq!(bin_factor(0, 100, 500.0, 1.0), 1);
        assert_eq!(bin_factor(0, 1000, 500.0, 2.0), 4);
        assert_eq!(bin_factor(0, 1000, 0.0, 1.0), 1);
    }

    #[test]
    fn test_snapped_range_has_lookback() {
        assert_eq!(snapped_range(10, 20, 4, 100), (4, 20));
        assert_eq!(snapped_range(0, 7, 4, 100), (0, 8));
        assert_eq!(snapped_range(90, 99, 4, 98), (84, 98));
    }

    #[test]
    fn test_visible_range() {
        let s = flat(100);
        assert_eq!(visible_raw_range(&s, 10.5, 20.0), (10, 20));
        assert_eq!(visible_raw_range(&s, -5.0, 500.0), (0, 100));
        assert_eq!(visible_raw_range(&s, 200.0, 300.0), (99, 100));
    }

    #[test]
    fn test_rebin_caches_until_key_or_scale_changes() {
        let mut s = flat(1000);
        let mut state = RebinState::new();
        assert!(rebin(&s, (0.0, 1000.0), 500.0, 1.0, &mut state));
        assert!(!rebin(&s, (0.0, 1000.0), 500.0, 1.0, &mut state));
        assert_eq!(state.computations(), 1);
        assert_eq!(state.bin_factor(), 2);

        s.y_scale_factor = 2.0;
        assert!(rebin(&s, (0.0, 1000.0), 500.0, 1.0, &mut state));
        assert_relative_eq!(state.points()[0].y, 4.0);

        state.invalidate();
        assert!(rebin(&s, (0.0, 1000.0), 500.0, 1.0, &mut state));
        assert_eq!(state.computations(), 3);
    }

    #[test]
    fn test_short_final_group_and_upper_edge() {
        let s = flat(5);
        let pts = group_points(&s, 0, 5, 2, 1.0);
        assert_eq!(pts.len(), 3);
        assert_relative_eq!(pts[2].y, 1.0);

        let mut state = RebinState::new();
        rebin(&s, (0.0, 5.0), 100.0, 1.0, &mut state);
        assert_relative_eq!(state.upper_edge(), 5.0);
    }

    #[test]
    fn test_background_subtract_floors_at_zero() {
        let fg = vec![DisplayPoint::new(0.0, 5.0), DisplayPoint::new(2.0, 1.0)];
        let bg = vec![DisplayPoint::new(0.1, 2.0), DisplayPoint::new(1.9, 3.0)];
        let out = background_subtract(&fg, &bg);
        assert_relative_eq!(out[0].y, 3.0);
        assert_relative_eq!(out[1].y, 0.0);
        assert_eq!(background_subtract(&fg, &[]), fg);
    }

    #[test]
    fn test_nearest_point() {
        let pts: Vec<_> = (0..5)
            .map(|i| DisplayPoint::new(f64::from(i) * 10.0, 0.0))
            .collect();
        assert_eq!(nearest_point(&pts, -3.0), Some(0));
        assert_eq!(nearest_point(&pts, 14.0), Some(1));
        assert_eq!(nearest_point(&pts, 16.0), Some(2));
        assert_eq!(nearest_point(&pts, 99.0), Some(4));
        assert_eq!(nearest_point(&[], 1.0), None);
    }
}
