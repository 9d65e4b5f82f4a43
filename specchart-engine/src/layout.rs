//! Pixel geometry of the chart container.

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::ChartOptions;

use crate::path::Rect;

/// Container-space rectangles for every chart area.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    /// Main plot area.
    pub plot: Rect,
    /// Overview chart area, when enabled.
    pub overview: Option<Rect>,
    /// Y-axis label strip left of the plot; dragging here rescales y.
    pub y_axis: Rect,
}

impl Layout {
    /// Derives the layout for a container of `width` x `height` pixels.
    #[must_use]
    pub fn compute(width: f64, height: f64, options: &ChartOptions) -> Self {
        let width = if width.is_finite() { width.max(0.0) } else { 0.0 };
        let height = if height.is_finite() { height.max(0.0) } else { 0.0 };
        let pad = options.padding;
        let overview_space = if options.show_overview {
            options.overview_height_px + options.overview_gap_px
        } else {
            0.0
        };
        let plot = Rect::new(
            pad.left,
            pad.top,
            width - pad.left - pad.right,
            height - pad.top - pad.bottom - overview_space,
        );
        let overview = options.show_overview.then(|| {
            Rect::new(
                plot.x,
                plot.bottom() + pad.bottom + options.overview_gap_px,
                plot.width,
                options.overview_height_px,
            )
        });
        Self {
            width,
            height,
            plot,
            overview,
            y_axis: Rect::new(0.0, plot.y, plot.x, plot.height),
        }
    }

    /// Converts container coordinates to plot-local ones.
    #[must_use]
    pub fn to_plot(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.plot.x, y - self.plot.y)
    }

    #[must_use]
    pub fn in_plot(&self, x: f64, y: f64) -> bool {
        self.plot.contains(x, y)
    }

    #[must_use]
    pub fn in_overview(&self, x: f64, y: f64) -> bool {
        self.overview.is_some_and(|r| r.contains(x, y))
    }

    #[must_use]
    pub fn in_y_axis(&self, x: f64, y: f64) -> bool {
        self.y_axis.width > 0.0 && self.y_axis.contains(x, y) && x < self.plot.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plot_area_from_padding() {
        let layout = Layout::compute(600.0, 400.0, &ChartOptions::default());
        assert_relative_eq!(layout.plot.x, 55.0);
        assert_relative_eq!(layout.plot.width, 535.0);
        assert_relative_eq!(layout.plot.height, 358.0);
        assert!(layout.overview.is_none());
        assert!(layout.in_y_axis(20.0, 100.0));
        assert!(!layout.in_y_axis(60.0, 100.0));
    }

    #[test]
    fn test_overview_sits_below_axis() {
        let options = ChartOptions::default().with_overview(50.0);
        let layout = Layout::compute(600.0, 400.0, &options);
        let overview = layout.overview.unwrap_or_default();
        assert_relative_eq!(layout.plot.height, 278.0);
        assert!(overview.y >= layout.plot.bottom());
        assert!(overview.bottom() <= 400.0);
        assert!(layout.in_overview(100.0, overview.y + 10.0));
    }

    #[test]
    fn test_tiny_container_never_negative() {
        let layout = Layout::compute(10.0, 10.0, &ChartOptions::default());
        assert!(layout.plot.width >= 0.0 && layout.plot.height >= 0.0);
    }
}
