//! Best-effort peak label placement.
//!
//! Labels are processed left to right. A label first sits just above its
//! peak summit; on collision it is raised above the labels it hits, then
//! shifted sideways, then put below the curve, and finally allowed to
//! overlap. Every placed label stays inside the plot area.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::geometry::LabelAnchor;
use crate::path::Rect;

/// Vertical gap between a label and its peak or neighbour.
const LABEL_GAP_PX: f64 = 3.0;

/// Font metrics used to size label boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelMetrics {
    pub char_width: f64,
    pub line_height: f64,
    /// Labels are never raised above this y.
    pub min_top: f64,
}

/// A label waiting to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRequest {
    pub anchor: LabelAnchor,
    pub lines: Vec<String>,
    /// Horizontal pixel range reserved for this peak; sideways shifts stay
    /// inside it.
    pub zone: (f64, f64),
}

/// Which rule produced a label position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Placement {
    Above,
    Raised,
    Shifted,
    Below,
    Overlapping,
}

/// A positioned label box in plot-local pixels.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PlacedLabel {
    pub rect: Rect,
    pub lines: Vec<String>,
    pub anchor_x: f64,
    pub placement: Placement,
}

impl LabelMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn size(&self, lines: &[String]) -> (f64, f64) {
        let chars = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        (
            chars as f64 * self.char_width,
            lines.len() as f64 * self.line_height,
        )
    }
}

fn clamp_into(rect: Rect, canvas: &Rect, min_top: f64) -> Rect {
    let max_x = (canvas.right() - rect.width).max(canvas.x);
    let min_y = min_top.max(canvas.y);
    let max_y = (canvas.bottom() - rect.height).max(min_y);
    Rect::new(
        rect.x.clamp(canvas.x, max_x),
        rect.y.clamp(min_y, max_y),
        rect.width,
        rect.height,
    )
}

fn collides(rect: &Rect, placed: &[PlacedLabel]) -> bool {
    placed.iter().any(|p| p.rect.intersects(rect))
}

/// Positions every request; output order matches ascending anchor x.
#[must_use]
pub fn place_labels(requests: &[LabelRequest], canvas: Rect, metrics: LabelMetrics) -> Vec<PlacedLabel> {
    let mut order: Vec<&LabelRequest> = requests.iter().filter(|r| !r.lines.is_empty()).collect();
    order.sort_by(|a, b| a.anchor.x_px.total_cmp(&b.anchor.x_px));

    let mut placed: Vec<PlacedLabel> = Vec::with_capacity(order.len());
    for request in order {
        let (width, height) = metrics.size(&request.lines);
        let anchor = request.anchor;
        let initial = clamp_into(
            Rect::new(
                anchor.x_px - width / 2.0,
                anchor.summit_px - LABEL_GAP_PX - height,
                width,
                height,
            ),
            &canvas,
            metrics.min_top,
        );

        let (rect, placement) = if collides(&initial, &placed) {
            raise(initial, &placed, metrics)
                .map(|r| (r, Placement::Raised))
                .or_else(|| shift(initial, request.zone, &canvas, &placed).map(|r| (r, Placement::Shifted)))
                .or_else(|| below(initial, anchor, &canvas, &placed).map(|r| (r, Placement::Below)))
                .unwrap_or((initial, Placement::Overlapping))
        } else {
            (initial, Placement::Above)
        };

        placed.push(PlacedLabel {
            rect,
            lines: request.lines.clone(),
            anchor_x: anchor.x_px,
            placement,
        });
    }
    placed
}

/// Moves the label above whatever it collides with, repeatedly.
fn raise(mut rect: Rect, placed: &[PlacedLabel], metrics: LabelMetrics) -> Option<Rect> {
    for _ in 0..=placed.len() {
        let blocker_top = placed
            .iter()
            .filter(|p| p.rect.intersects(&rect))
            .map(|p| p.rect.y)
            .fold(f64::INFINITY, f64::min);
        if !blocker_top.is_finite() {
            return Some(rect);
        }
        let y = blocker_top - LABEL_GAP_PX - rect.height;
        if y < metrics.min_top {
            return None;
        }
        rect = Rect::new(rect.x, y, rect.width, rect.height);
    }
    None
}

/// Slides the label up to half its width either way, staying in its zone.
fn shift(rect: Rect, zone: (f64, f64), canvas: &Rect, placed: &[PlacedLabel]) -> Option<Rect> {
    let max_shift = rect.width / 2.0;
    let steps = 8;
    for step in 1..=steps {
        let dx = max_shift * f64::from(step) / f64::from(steps);
        for candidate_x in [rect.x + dx, rect.x - dx] {
            let candidate = Rect::new(candidate_x, rect.y, rect.width, rect.height);
            let centre = candidate_x + rect.width / 2.0;
            let inside_zone = centre >= zone.0 && centre <= zone.1;
            let on_canvas = candidate.x >= canvas.x && candidate.right() <= canvas.right();
            if inside_zone && on_canvas && !collides(&candidate, placed) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Puts the label under the curve when there is room for it.
fn below(rect: Rect, anchor: LabelAnchor, canvas: &Rect, placed: &[PlacedLabel]) -> Option<Rect> {
    let y = anchor.base_px + LABEL_GAP_PX;
    if y + rect.height > canvas.bottom() {
        return None;
    }
    let candidate = Rect::new(rect.x, y, rect.width, rect.height);
    (!collides(&candidate, placed)).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> LabelMetrics {
        LabelMetrics {
            char_width: 6.0,
            line_height: 12.0,
            min_top: 0.0,
        }
    }

    fn request(x: f64, summit: f64, base: f64, text: &str) -> LabelRequest {
        LabelRequest {
            anchor: LabelAnchor {
                peak_index: 0,
                mean: 0.0,
                x_px: x,
                base_px: base,
                summit_px: summit,
            },
            lines: vec![text.to_string()],
            zone: (0.0, 400.0),
        }
    }

    #[test]
    fn test_single_label_sits_above_summit() {
        let canvas = Rect::new(0.0, 0.0, 400.0, 300.0);
        let out = place_labels(&[request(100.0, 100.0, 250.0, "661.7")], canvas, metrics());
        assert_eq!(out[0].placement, Placement::Above);
        assert!(out[0].rect.bottom() <= 100.0);
    }

    #[test]
    fn test_colliding_label_is_raised() {
        let canvas = Rect::new(0.0, 0.0, 400.0, 300.0);
        let reqs = [
            request(100.0, 100.0, 250.0, "first"),
            request(105.0, 100.0, 250.0, "second"),
        ];
        let out = place_labels(&reqs, canvas, metrics());
        assert_eq!(out[1].placement, Placement::Raised);
        assert!(!out[0].rect.intersects(&out[1].rect));
    }

    #[test]
    fn test_labels_never_leave_canvas() {
        let canvas = Rect::new(0.0, 0.0, 200.0, 100.0);
        let reqs: Vec<_> = (0..12)
            .map(|i| request(f64::from(i) * 3.0, 5.0, 95.0, "a long label"))
            .collect();
        for label in place_labels(&reqs, canvas, metrics()) {
            assert!(label.rect.x >= canvas.x && label.rect.right() <= canvas.right());
            assert!(label.rect.y >= canvas.y && label.rect.bottom() <= canvas.bottom());
        }
    }

    #[test]
    fn test_label_at_right_edge_is_pulled_in() {
        let canvas = Rect::new(0.0, 0.0, 200.0, 100.0);
        let out = place_labels(&[request(199.0, 50.0, 90.0, "edge")], canvas, metrics());
        assert!(out[0].rect.right() <= 200.0);
    }
}
