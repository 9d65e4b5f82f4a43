//! Paints a rendered chart frame with egui shapes.
#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use eframe::egui::{self, Align2, FontId, Pos2, Shape, Stroke};
use specchart_engine::frame::Frame;
use specchart_engine::path::{PixelPoint, Rect};

use super::theme::{to_color32, ChartColors};

const TICK_LEN: f32 = 5.0;
const MINOR_TICK_LEN: f32 = 3.0;

fn font() -> FontId {
    FontId::monospace(10.0)
}

/// Maps engine coordinates relative to `origin` onto the screen.
#[derive(Clone, Copy)]
struct Space {
    origin: Pos2,
}

impl Space {
    fn new(widget: Pos2, area: Rect) -> Self {
        Self {
            origin: Pos2::new(widget.x + area.x as f32, widget.y + area.y as f32),
        }
    }

    fn pos(self, x: f64, y: f64) -> Pos2 {
        Pos2::new(self.origin.x + x as f32, self.origin.y + y as f32)
    }

    fn point(self, p: &PixelPoint) -> Pos2 {
        self.pos(p.x, p.y)
    }

    fn path(self, path: &[PixelPoint]) -> Vec<Pos2> {
        path.iter().map(|p| self.point(p)).collect()
    }

    fn rect(self, x0: f64, y0: f64, x1: f64, y1: f64) -> egui::Rect {
        egui::Rect::from_two_pos(self.pos(x0, y0), self.pos(x1, y1))
    }
}

fn screen_rect(widget: Pos2, r: Rect) -> egui::Rect {
    Space::new(widget, r).rect(0.0, 0.0, r.width, r.height)
}

/// Draws `frame` inside the widget whose top-left corner is `widget`.
///
/// Returns the screen rectangle of the legend's close button, if a legend
/// was drawn.
pub fn paint_frame(
    painter: &egui::Painter,
    widget: Pos2,
    frame: &Frame,
    colors: &ChartColors,
) -> Option<egui::Rect> {
    let plot = frame.layout.plot;
    let space = Space::new(widget, plot);
    let plot_rect = screen_rect(widget, plot);
    let (w, h) = (plot.width, plot.height);

    painter.rect_filled(plot_rect, 0.0, colors.background);

    let grid = Stroke::new(0.5, colors.grid);
    for &x in &frame.grid_x {
        painter.line_segment([space.pos(x, 0.0), space.pos(x, h)], grid);
    }
    for &y in &frame.grid_y {
        painter.line_segment([space.pos(0.0, y), space.pos(w, y)], grid);
    }

    for band in frame.search_windows.iter().chain(&frame.highlights) {
        let fill = band
            .fill
            .map_or(colors.selection, |c| to_color32(c).gamma_multiply(0.4));
        painter.rect_filled(space.rect(band.x0_px, 0.0, band.x1_px, h), 0.0, fill);
    }

    let clipped = painter.with_clip_rect(plot_rect);
    paint_rois(&clipped, space, frame, colors);
    for line in &frame.lines {
        let color = colors.spectrum(line.spectrum_type, line.color);
        clipped.add(Shape::line(space.path(&line.path), Stroke::new(1.0, color)));
    }
    paint_reference_lines(&clipped, space, frame, h);
    for marker in &frame.markers {
        let stroke = Stroke::new(1.0, colors.marker);
        clipped.add(Shape::dashed_line(
            &[space.pos(marker.x_px, 0.0), space.pos(marker.x_px, h)],
            stroke,
            4.0,
            3.0,
        ));
        clipped.text(
            space.pos(marker.x_px + 3.0, 2.0),
            Align2::LEFT_TOP,
            marker.kind.label(),
            font(),
            colors.marker,
        );
    }
    for label in &frame.labels {
        let r = label.rect;
        let mut y = r.y;
        for text in &label.lines {
            clipped.text(space.pos(r.x, y), Align2::LEFT_TOP, text, font(), colors.text);
            y += r.height / label.lines.len().max(1) as f64;
        }
    }
    paint_scalers(&clipped, space, frame, colors);
    if let Some(overlay) = &frame.overlay {
        let r = space.rect(overlay.x0, overlay.y0, overlay.x1, overlay.y1);
        clipped.rect(r, 0.0, colors.selection, Stroke::new(1.0, colors.axis));
        if !overlay.text.is_empty() {
            clipped.text(
                r.center_top() + egui::vec2(0.0, 2.0),
                Align2::CENTER_TOP,
                &overlay.text,
                font(),
                colors.text,
            );
        }
    }

    painter.rect_stroke(plot_rect, 0.0, Stroke::new(1.0, colors.axis));
    paint_axes(painter, space, frame, colors);
    paint_overview(painter, widget, frame, colors);
    if let Some(hover) = &frame.hover {
        let mut y = 4.0;
        for text in &hover.text {
            clipped.text(space.pos(8.0, y), Align2::LEFT_TOP, text, font(), colors.text);
            y += 12.0;
        }
    }
    paint_legend(painter, plot_rect, frame, colors)
}

fn paint_rois(painter: &egui::Painter, space: Space, frame: &Frame, colors: &ChartColors) {
    for roi in &frame.rois {
        let paths = &roi.paths;
        for (i, fill) in paths.peak_fill_paths.iter().enumerate() {
            let color = roi
                .peak_colors
                .get(i)
                .copied()
                .flatten()
                .map_or(colors.peak_fill, |c| to_color32(c).gamma_multiply(0.35));
            painter.add(Shape::convex_polygon(space.path(fill), color, Stroke::NONE));
        }
        for outline in &paths.peak_outline_paths {
            painter.add(Shape::line(
                space.path(outline),
                Stroke::new(1.0, colors.marker),
            ));
        }
        painter.add(Shape::line(
            space.path(&paths.continuum_path),
            Stroke::new(1.0, colors.continuum),
        ));
    }
}

fn paint_reference_lines(painter: &egui::Painter, space: Space, frame: &Frame, h: f64) {
    for (i, line) in frame.reference_lines.iter().enumerate() {
        let width = if frame.hovered_reference == Some(i) {
            2.0
        } else {
            1.0
        };
        painter.line_segment(
            [space.pos(line.x_px, line.top_px), space.pos(line.x_px, h)],
            Stroke::new(width, to_color32(line.color)),
        );
    }
}

fn paint_scalers(painter: &egui::Painter, space: Space, frame: &Frame, colors: &ChartColors) {
    for slider in &frame.scalers {
        let color = colors.spectrum(slider.spectrum_type, None);
        painter.line_segment(
            [
                space.pos(slider.x_px, slider.track_top),
                space.pos(slider.x_px, slider.track_bottom),
            ],
            Stroke::new(2.0, colors.grid),
        );
        painter.circle_filled(space.pos(slider.x_px, slider.handle_y), 5.0, color);
        painter.text(
            space.pos(slider.x_px - 8.0, slider.handle_y),
            Align2::RIGHT_CENTER,
            format!("x{:.2}", slider.factor),
            font(),
            colors.text_muted,
        );
    }
}

fn paint_axes(painter: &egui::Painter, space: Space, frame: &Frame, colors: &ChartColors) {
    let plot = frame.layout.plot;
    let stroke = Stroke::new(1.0, colors.axis);
    for tick in &frame.x_ticks {
        let len = if tick.is_major() { TICK_LEN } else { MINOR_TICK_LEN };
        let base = space.pos(tick.px, plot.height);
        painter.line_segment([base, base + egui::vec2(0.0, len)], stroke);
        if let Some(label) = &tick.label {
            painter.text(
                base + egui::vec2(0.0, TICK_LEN + 1.0),
                Align2::CENTER_TOP,
                label,
                font(),
                colors.text_muted,
            );
        }
    }
    for tick in &frame.y_ticks {
        let len = if tick.is_major() { TICK_LEN } else { MINOR_TICK_LEN };
        let base = space.pos(0.0, tick.px);
        painter.line_segment([base, base - egui::vec2(len, 0.0)], stroke);
        if let Some(label) = &tick.label {
            painter.text(
                base - egui::vec2(TICK_LEN + 2.0, 0.0),
                Align2::RIGHT_CENTER,
                label,
                font(),
                colors.text_muted,
            );
        }
    }
    painter.text(
        space.pos(plot.width, plot.height + 18.0),
        Align2::RIGHT_TOP,
        "Energy (keV)",
        font(),
        colors.text_muted,
    );
}

fn paint_overview(painter: &egui::Painter, widget: Pos2, frame: &Frame, colors: &ChartColors) {
    let Some(overview) = &frame.overview else {
        return;
    };
    let space = Space::new(widget, overview.rect);
    let rect = screen_rect(widget, overview.rect);
    painter.rect_filled(rect, 0.0, colors.background);
    let clipped = painter.with_clip_rect(rect);
    for line in &overview.lines {
        let color = colors.spectrum(line.spectrum_type, line.color);
        clipped.add(Shape::line(space.path(&line.path), Stroke::new(1.0, color)));
    }
    let (s0, s1) = overview.selection;
    clipped.rect(
        space.rect(s0, 0.0, s1, overview.rect.height),
        0.0,
        colors.selection,
        Stroke::new(1.0, colors.foreground),
    );
    painter.rect_stroke(rect, 0.0, Stroke::new(1.0, colors.axis));
}

fn paint_legend(
    painter: &egui::Painter,
    plot_rect: egui::Rect,
    frame: &Frame,
    colors: &ChartColors,
) -> Option<egui::Rect> {
    let entries = frame.legend.as_ref().filter(|e| !e.is_empty())?;
    let row = 13.0;
    let rows: usize = entries.iter().map(|e| 1 + e.details.len()).sum();
    let size = egui::vec2(190.0, 8.0 + row * rows as f32);
    let rect = egui::Rect::from_min_size(
        plot_rect.right_top() + egui::vec2(-size.x - 8.0, 8.0),
        size,
    );
    painter.rect(
        rect,
        3.0,
        colors.background.gamma_multiply(0.9),
        Stroke::new(1.0, colors.grid),
    );

    let mut y = rect.top() + 4.0;
    for entry in entries {
        let color = colors.spectrum(entry.spectrum_type, entry.color);
        let x = rect.left() + 6.0;
        painter.line_segment(
            [Pos2::new(x, y + row / 2.0), Pos2::new(x + 14.0, y + row / 2.0)],
            Stroke::new(2.0, color),
        );
        let title = if entry.title.is_empty() {
            entry.spectrum_type.as_str()
        } else {
            entry.title.as_str()
        };
        painter.text(Pos2::new(x + 20.0, y), Align2::LEFT_TOP, title, font(), colors.text);
        y += row;
        for detail in &entry.details {
            painter.text(
                Pos2::new(x + 20.0, y),
                Align2::LEFT_TOP,
                detail,
                font(),
                colors.text_muted,
            );
            y += row;
        }
    }

    let close = egui::Rect::from_min_size(
        rect.right_top() + egui::vec2(-14.0, 2.0),
        egui::vec2(12.0, 12.0),
    );
    painter.text(close.center(), Align2::CENTER_CENTER, "x", font(), colors.text_muted);
    Some(close)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_offsets_by_area() {
        let space = Space::new(Pos2::new(10.0, 20.0), Rect::new(55.0, 10.0, 300.0, 200.0));
        assert_eq!(space.pos(0.0, 0.0), Pos2::new(65.0, 30.0));
        assert_eq!(
            space.point(&PixelPoint::new(5.0, 7.0)),
            Pos2::new(70.0, 37.0)
        );
        let r = space.rect(10.0, 50.0, 0.0, 40.0);
        assert_eq!(r.min, Pos2::new(65.0, 70.0));
        assert_eq!(r.max, Pos2::new(75.0, 80.0));
    }
}
