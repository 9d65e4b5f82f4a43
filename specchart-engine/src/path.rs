//! Pixel-space polylines.

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::DisplayPoint;

use crate::scale::{finite_or_zero, LinearScale, YScale};

/// A point in plot-local pixels (origin at the top left of the plot area).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: finite_or_zero(x),
            y: finite_or_zero(y),
        }
    }
}

/// Polyline in plot-local pixels.
pub type Path = Vec<PixelPoint>;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Whether the two rectangles overlap with positive area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Histogram step line through `points`.
///
/// Each point spans from its energy to the next point's energy; the last one
/// ends at `upper_edge`.
#[must_use]
pub fn step_path(points: &[DisplayPoint], upper_edge: f64, x: &LinearScale, y: &YScale) -> Path {
    let mut path = Vec::with_capacity(points.len() * 2);
    for (i, p) in points.iter().enumerate() {
        let end = points.get(i + 1).map_or(upper_edge, |next| next.x);
        let py = y.map(p.y);
        path.push(PixelPoint::new(x.map(p.x), py));
        path.push(PixelPoint::new(x.map(end), py));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use specchart_core::YScaleMode;

    #[test]
    fn test_step_path_shape() {
        let x = LinearScale::new((0.0, 10.0), (0.0, 100.0));
        let y = YScale::new(YScaleMode::Linear, (0.0, 10.0), 100.0);
        let pts = [DisplayPoint::new(0.0, 5.0), DisplayPoint::new(5.0, 10.0)];
        let path = step_path(&pts, 10.0, &x, &y);
        assert_eq!(
            path,
            vec![
                PixelPoint::new(0.0, 50.0),
                PixelPoint::new(50.0, 50.0),
                PixelPoint::new(50.0, 0.0),
                PixelPoint::new(100.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 5.0, 5.0)));
        assert!(a.contains(10.0, 10.0));
    }
}
