//! Scale Manager: energy and counts coordinate transforms.
//!
//! The x scale maps energy linearly onto `[0, width]` pixels of the plot
//! area. The y scale maps counts onto `[0, height]` with pixel 0 at the top
//! of the plot, i.e. the domain maximum sits at the smallest pixel value.

use specchart_core::{DisplayPoint, YPadding, YScaleMode};

/// Energy domain used when no data is loaded.
pub const DEFAULT_X_DOMAIN: (f64, f64) = (0.0, 3000.0);
/// Counts domain used when no data is loaded.
pub const DEFAULT_Y_DOMAIN: (f64, f64) = (0.0, 100.0);
/// Bottom of the log axis when the visible minimum is not positive.
pub const LOG_FLOOR: f64 = 0.1;

/// Replaces NaN or infinite pixel values with zero.
#[inline]
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Linear scale between a domain and a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl Default for LinearScale {
    fn default() -> Self {
        Self::new(DEFAULT_X_DOMAIN, (0.0, 1.0))
    }
}

impl LinearScale {
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    #[must_use]
    #[inline]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[must_use]
    #[inline]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Width of the domain.
    #[must_use]
    #[inline]
    pub fn span(&self) -> f64 {
        self.domain.1 - self.domain.0
    }

    /// Pixel extent of the range.
    #[must_use]
    #[inline]
    pub fn pixel_span(&self) -> f64 {
        self.range.1 - self.range.0
    }

    pub fn set_domain(&mut self, min: f64, max: f64) {
        self.domain = (min, max);
    }

    pub fn set_range(&mut self, start: f64, end: f64) {
        self.range = (start, end);
    }

    /// Domain value to pixel.
    #[must_use]
    pub fn map(&self, value: f64) -> f64 {
        let span = self.span();
        if span == 0.0 {
            return finite_or_zero(self.range.0);
        }
        let t = (value - self.domain.0) / span;
        finite_or_zero(self.range.0 + t * self.pixel_span())
    }

    /// Pixel to domain value.
    #[must_use]
    pub fn invert(&self, px: f64) -> f64 {
        let pixels = self.pixel_span();
        if pixels == 0.0 {
            return finite_or_zero(self.domain.0);
        }
        let t = (px - self.range.0) / pixels;
        finite_or_zero(self.domain.0 + t * self.span())
    }

    /// Domain distance covered by `px` pixels.
    #[must_use]
    pub fn pixels_to_span(&self, px: f64) -> f64 {
        let pixels = self.pixel_span();
        if pixels == 0.0 {
            0.0
        } else {
            finite_or_zero(px * self.span() / pixels)
        }
    }
}

/// Counts scale in one of the three y modes.
///
/// Pixel `0` (top of the plot) corresponds to the domain maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YScale {
    mode: YScaleMode,
    min: f64,
    max: f64,
    height: f64,
}

impl Default for YScale {
    fn default() -> Self {
        Self {
            mode: YScaleMode::Linear,
            min: DEFAULT_Y_DOMAIN.0,
            max: DEFAULT_Y_DOMAIN.1,
            height: 1.0,
        }
    }
}

impl YScale {
    #[must_use]
    pub fn new(mode: YScaleMode, domain: (f64, f64), height: f64) -> Self {
        Self {
            mode,
            min: domain.0,
            max: domain.1,
            height,
        }
    }

    #[must_use]
    #[inline]
    pub fn mode(&self) -> YScaleMode {
        self.mode
    }

    /// Domain as `(min, max)`.
    #[must_use]
    #[inline]
    pub fn domain(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    #[must_use]
    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_mode(&mut self, mode: YScaleMode) {
        self.mode = mode;
    }

    pub fn set_domain(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
    }

    pub fn set_height(&mut self, height: f64) {
        self.height = height;
    }

    fn forward(&self, value: f64) -> f64 {
        match self.mode {
            YScaleMode::Linear => value,
            YScaleMode::Log => value.log10(),
            YScaleMode::Sqrt => value.signum() * value.abs().sqrt(),
        }
    }

    fn backward(&self, t: f64) -> f64 {
        match self.mode {
            YScaleMode::Linear => t,
            YScaleMode::Log => 10f64.powf(t),
            YScaleMode::Sqrt => t.signum() * t * t,
        }
    }

    /// Counts to pixel.
    ///
    /// Non-positive counts on a log axis land on the bottom of the plot.
    #[must_use]
    pub fn map(&self, value: f64) -> f64 {
        if self.mode == YScaleMode::Log && value <= 0.0 {
            return finite_or_zero(self.height);
        }
        let lo = self.forward(self.min);
        let hi = self.forward(self.max);
        let span = hi - lo;
        if span == 0.0 || !span.is_finite() {
            return finite_or_zero(self.height);
        }
        let t = (self.forward(value) - lo) / span;
        finite_or_zero(self.height - t * self.height)
    }

    /// Pixel to counts.
    #[must_use]
    pub fn invert(&self, px: f64) -> f64 {
        if self.height == 0.0 {
            return finite_or_zero(self.min);
        }
        let lo = self.forward(self.min);
        let hi = self.forward(self.max);
        let t = (self.height - px) / self.height;
        finite_or_zero(self.backward(lo + t * (hi - lo)))
    }
}

/// Shifts `domain` inside `bounds`, keeping its width when it fits.
///
/// A domain wider than the bounds collapses to the bounds.
#[must_use]
pub fn clamp_to_bounds(domain: (f64, f64), bounds: (f64, f64)) -> (f64, f64) {
    let width = domain.1 - domain.0;
    if width >= bounds.1 - bounds.0 {
        return bounds;
    }
    if domain.0 < bounds.0 {
        (bounds.0, bounds.0 + width)
    } else if domain.1 > bounds.1 {
        (bounds.1 - width, bounds.1)
    } else {
        domain
    }
}

/// Raw `(min, max)` of the visible display points.
///
/// Points whose group starts at or beyond `x_max` are ignored; the one-group
/// lookback point below `x_min` is kept since part of it is on screen.
#[must_use]
pub fn visible_y_range<'a, I>(series: I, x_max: f64) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a [DisplayPoint]>,
{
    let mut range: Option<(f64, f64)> = None;
    for points in series {
        for p in points.iter().filter(|p| p.x < x_max && p.y.is_finite()) {
            range = Some(match range {
                None => (p.y, p.y),
                Some((lo, hi)) => (lo.min(p.y), hi.max(p.y)),
            });
        }
    }
    range
}

/// Widens a raw counts range into a display domain for the given mode.
///
/// Reversed bounds are swapped and equal bounds are expanded by one count on
/// each side before padding is applied.
#[must_use]
pub fn padded_y_domain(raw: (f64, f64), mode: YScaleMode, padding: YPadding) -> (f64, f64) {
    let (mut y_min, mut y_max) = raw;
    if !y_min.is_finite() || !y_max.is_finite() {
        return DEFAULT_Y_DOMAIN;
    }
    if y_min > y_max {
        std::mem::swap(&mut y_min, &mut y_max);
    }
    if y_min == y_max {
        y_min -= 1.0;
        y_max += 1.0;
    }

    let (lower, upper) = match mode {
        YScaleMode::Linear => {
            let lower = if y_min <= 0.0 {
                y_min * (1.0 + padding.bottom)
            } else {
                y_min * (1.0 - padding.bottom)
            };
            (lower, y_max * (1.0 + padding.top))
        }
        YScaleMode::Log => {
            let y_min = if y_min <= 0.0 { LOG_FLOOR } else { y_min };
            let y_max = if y_max <= y_min { y_min * 10.0 } else { y_max };
            let log_min = y_min.log10();
            let log_max = y_max.log10();
            let span = log_max - log_min;
            (
                10f64.powf(log_min - padding.bottom * span),
                10f64.powf(log_max + padding.top * span),
            )
        }
        YScaleMode::Sqrt => {
            let lower = if y_min <= 0.0 {
                0.0
            } else {
                y_min * (1.0 - padding.bottom)
            };
            (lower, y_max * (1.0 + padding.top))
        }
    };

    if !lower.is_finite() || !upper.is_finite() {
        return DEFAULT_Y_DOMAIN;
    }
    if lower >= upper {
        return (lower, lower + 1.0);
    }
    (lower, upper)
}

/// Owner of the x and y transforms and the single source of truth for the
/// visible domains.
#[derive(Debug, Clone, Default)]
pub struct ScaleManager {
    x: LinearScale,
    y: YScale,
    /// Explicit y domain installed by the host or a y-zoom gesture.
    y_override: Option<(f64, f64)>,
    /// Set while the user drags the y axis; suppresses recomputation.
    y_drag_active: bool,
}

impl ScaleManager {
    /// Creates scales for a plot area of the given pixel size.
    #[must_use]
    pub fn new(width: f64, height: f64, mode: YScaleMode) -> Self {
        Self {
            x: LinearScale::new(DEFAULT_X_DOMAIN, (0.0, width)),
            y: YScale::new(mode, DEFAULT_Y_DOMAIN, height),
            y_override: None,
            y_drag_active: false,
        }
    }

    #[must_use]
    #[inline]
    pub fn x(&self) -> &LinearScale {
        &self.x
    }

    #[must_use]
    #[inline]
    pub fn y(&self) -> &YScale {
        &self.y
    }

    #[must_use]
    #[inline]
    pub fn x_domain(&self) -> (f64, f64) {
        self.x.domain()
    }

    #[must_use]
    #[inline]
    pub fn y_domain(&self) -> (f64, f64) {
        self.y.domain()
    }

    #[must_use]
    #[inline]
    pub fn width(&self) -> f64 {
        self.x.pixel_span()
    }

    #[must_use]
    #[inline]
    pub fn height(&self) -> f64 {
        self.y.height()
    }

    /// Resizes the pixel ranges.
    pub fn set_plot_size(&mut self, width: f64, height: f64) {
        self.x.set_range(0.0, width.max(0.0));
        self.y.set_height(height.max(0.0));
    }

    /// Sets the visible energy range.
    ///
    /// Does not clamp; callers clamp to the data bounds. Returns whether the
    /// domain actually changed. A changed x domain drops any explicit y
    /// override.
    pub fn set_x_range(&mut self, min: f64, max: f64) -> bool {
        if !min.is_finite() || !max.is_finite() || min >= max {
            log::warn!("ignoring degenerate x range [{min}, {max}]");
            return false;
        }
        let changed = self.x.domain() != (min, max);
        if changed {
            self.x.set_domain(min, max);
            self.y_override = None;
        }
        changed
    }

    pub fn set_y_mode(&mut self, mode: YScaleMode) {
        if self.y.mode() != mode {
            self.y.set_mode(mode);
            self.y_override = None;
        }
    }

    /// Installs an explicit y domain that survives redraws until the x
    /// domain, y mode, or data change.
    pub fn set_y_override(&mut self, min: f64, max: f64) {
        if !min.is_finite() || !max.is_finite() || min >= max {
            log::warn!("ignoring degenerate y range [{min}, {max}]");
            return;
        }
        if self.y.mode() == YScaleMode::Log && min <= 0.0 {
            log::warn!("ignoring non-positive log y minimum {min}");
            return;
        }
        self.y_override = Some((min, max));
        self.y.set_domain(min, max);
    }

    pub fn clear_y_override(&mut self) {
        self.y_override = None;
    }

    #[must_use]
    pub fn y_override(&self) -> Option<(f64, f64)> {
        self.y_override
    }

    /// Marks the start or end of a y-axis drag.
    pub fn set_y_drag_active(&mut self, active: bool) {
        self.y_drag_active = active;
    }

    #[must_use]
    pub fn y_drag_active(&self) -> bool {
        self.y_drag_active
    }

    /// Sets the y domain directly, for live gesture feedback.
    pub fn set_y_domain_live(&mut self, min: f64, max: f64) {
        if min.is_finite() && max.is_finite() && min < max {
            self.y.set_domain(min, max);
        }
    }

    /// Restores a previously captured y state.
    pub fn restore_y(&mut self, domain: (f64, f64), y_override: Option<(f64, f64)>) {
        self.y.set_domain(domain.0, domain.1);
        self.y_override = y_override;
    }

    /// Recomputes the y domain from the visible data range.
    ///
    /// Skipped while a y-axis drag is in progress. An explicit override
    /// wins over the data; no data falls back to the default domain.
    pub fn recompute_y_domain(&mut self, raw: Option<(f64, f64)>, padding: YPadding) {
        if self.y_drag_active {
            return;
        }
        let (min, max) = match (self.y_override, raw) {
            (Some(domain), _) => domain,
            (None, Some(raw)) => padded_y_domain(raw, self.y.mode(), padding),
            (None, None) => DEFAULT_Y_DOMAIN,
        };
        let (min, max) = if self.y.mode() == YScaleMode::Log && min <= 0.0 {
            (LOG_FLOOR, max.max(LOG_FLOOR * 10.0))
        } else {
            (min, max)
        };
        self.y.set_domain(min, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_scale_round_trip() {
        let s = LinearScale::new((100.0, 200.0), (0.0, 500.0));
        assert_relative_eq!(s.map(150.0), 250.0);
        assert_relative_eq!(s.invert(250.0), 150.0);
        assert_relative_eq!(s.pixels_to_span(5.0), 1.0);
    }

    #[test]
    fn test_degenerate_scale_never_nan() {
        let s = LinearScale::new((1.0, 1.0), (0.0, 0.0));
        assert!(s.map(f64::NAN).is_finite());
        assert!(s.invert(10.0).is_finite());
        let y = YScale::new(YScaleMode::Log, (0.0, 0.0), 100.0);
        assert!(y.map(5.0).is_finite());
    }

    #[test]
    fn test_y_scale_modes() {
        let lin = YScale::new(YScaleMode::Linear, (0.0, 100.0), 200.0);
        assert_relative_eq!(lin.map(100.0), 0.0);
        assert_relative_eq!(lin.map(0.0), 200.0);
        assert_relative_eq!(lin.invert(100.0), 50.0);

        let log = YScale::new(YScaleMode::Log, (1.0, 1000.0), 300.0);
        assert_relative_eq!(log.map(10.0), 200.0, epsilon = 1e-9);
        assert_relative_eq!(log.invert(100.0), 100.0, epsilon = 1e-9);
        assert_relative_eq!(log.map(0.0), 300.0);

        let sqrt = YScale::new(YScaleMode::Sqrt, (0.0, 100.0), 100.0);
        assert_relative_eq!(sqrt.map(25.0), 50.0, epsilon = 1e-9);
        assert_relative_eq!(sqrt.invert(50.0), 25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_linear_padding() {
        let d = padded_y_domain((10.0, 100.0), YScaleMode::Linear, YPadding::new(0.1, 0.1));
        assert_relative_eq!(d.0, 9.0, epsilon = 1e-12);
        assert_relative_eq!(d.1, 110.0, epsilon = 1e-12);

        let d = padded_y_domain((-10.0, 100.0), YScaleMode::Linear, YPadding::new(0.1, 0.1));
        assert_relative_eq!(d.0, -11.0, epsilon = 1e-12);
    }

    #[test]
    fn test_log_padding() {
        let d = padded_y_domain((1.0, 1000.0), YScaleMode::Log, YPadding::new(0.05, 0.025));
        assert!(d.0 < 1.0);
        assert!(d.1 > 1000.0);

        let d = padded_y_domain((0.0, 1000.0), YScaleMode::Log, YPadding::new(0.05, 0.025));
        assert!(d.0 > 0.0 && d.0 < LOG_FLOOR);
    }

    #[test]
    fn test_sqrt_padding_and_degenerate() {
        let d = padded_y_domain((0.0, 50.0), YScaleMode::Sqrt, YPadding::new(0.1, 0.1));
        assert_relative_eq!(d.0, 0.0);
        assert_relative_eq!(d.1, 55.0, epsilon = 1e-12);

        let d = padded_y_domain((5.0, 5.0), YScaleMode::Linear, YPadding::new(0.0, 0.0));
        assert_relative_eq!(d.0, 4.0);
        assert_relative_eq!(d.1, 6.0);

        let d = padded_y_domain((100.0, 10.0), YScaleMode::Linear, YPadding::new(0.0, 0.0));
        assert_eq!(d, (10.0, 100.0));

        assert_eq!(
            padded_y_domain((f64::NAN, 1.0), YScaleMode::Linear, YPadding::new(0.1, 0.1)),
            DEFAULT_Y_DOMAIN
        );
    }

    #[test]
    fn test_visible_range_ignores_points_past_domain() {
        let pts = vec![
            DisplayPoint::new(0.0, 3.0),
            DisplayPoint::new(10.0, 7.0),
            DisplayPoint::new(20.0, 100.0),
        ];
        assert_eq!(visible_y_range([pts.as_slice()], 20.0), Some((3.0, 7.0)));
        assert_eq!(visible_y_range(std::iter::empty::<&[DisplayPoint]>(), 1.0), None);
    }

    #[test]
    fn test_manager_override_and_drag() {
        let mut m = ScaleManager::new(100.0, 100.0, YScaleMode::Linear);
        let pad = YPadding::new(0.1, 0.1);
        m.recompute_y_domain(Some((10.0, 100.0)), pad);
        assert_relative_eq!(m.y_domain().1, 110.0, epsilon = 1e-12);

        m.set_y_override(0.0, 5.0);
        m.recompute_y_domain(Some((10.0, 100.0)), pad);
        assert_eq!(m.y_domain(), (0.0, 5.0));

        assert!(m.set_x_range(0.0, 10.0));
        assert!(m.y_override().is_none());

        m.set_y_drag_active(true);
        m.set_y_domain_live(1.0, 2.0);
        m.recompute_y_domain(Some((10.0, 100.0)), pad);
        assert_eq!(m.y_domain(), (1.0, 2.0));

        m.set_y_drag_active(false);
        m.recompute_y_domain(None, pad);
        assert_eq!(m.y_domain(), DEFAULT_Y_DOMAIN);
    }

    #[test]
    fn test_clamp_to_bounds() {
        assert_eq!(clamp_to_bounds((-10.0, 10.0), (0.0, 100.0)), (0.0, 20.0));
        assert_eq!(clamp_to_bounds((95.0, 105.0), (0.0, 100.0)), (90.0, 100.0));
        assert_eq!(clamp_to_bounds((-50.0, 150.0), (0.0, 100.0)), (0.0, 100.0));
        assert_eq!(clamp_to_bounds((20.0, 30.0), (0.0, 100.0)), (20.0, 30.0));
    }

    #[test]
    fn test_set_x_range_rejects_degenerate() {
        let mut m = ScaleManager::new(100.0, 100.0, YScaleMode::Linear);
        assert!(!m.set_x_range(5.0, 5.0));
        assert!(!m.set_x_range(f64::NAN, 5.0));
        assert_eq!(m.x_domain(), DEFAULT_X_DOMAIN);
    }
}
