//! Main view (central panel) hosting the chart.

use eframe::egui;
use specchart_engine::Mode;

use super::painter::paint_frame;
use super::theme::ChartColors;
use crate::app::SpecchartApp;

fn cursor_for(mode: Option<Mode>, roi_edge_hover: bool) -> egui::CursorIcon {
    match mode {
        Some(Mode::Pan | Mode::OverviewDrag) => egui::CursorIcon::Grabbing,
        Some(Mode::RoiDrag) => egui::CursorIcon::ResizeHorizontal,
        Some(Mode::ScalerDrag | Mode::YAxisDrag | Mode::ZoomY) => {
            egui::CursorIcon::ResizeVertical
        }
        Some(_) => egui::CursorIcon::Crosshair,
        None if roi_edge_hover => egui::CursorIcon::ResizeHorizontal,
        None => egui::CursorIcon::Default,
    }
}

impl SpecchartApp {
    /// Render the central panel: forward input, advance timers, paint.
    pub(crate) fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, response) =
                ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());

            let (width, height) = (f64::from(rect.width()), f64::from(rect.height()));
            let layout = self.chart.layout();
            if (layout.width - width).abs() >= 1.0 || (layout.height - height).abs() >= 1.0 {
                self.chart.handle_resize(width, height);
            }

            let (events, mods, time_s) = ui.input(|i| (i.events.clone(), i.modifiers, i.time));
            let time_ms = time_s * 1000.0;
            for event in &events {
                if let (Some(close), egui::Event::PointerButton { pos, pressed: true, .. }) =
                    (self.legend_close, event)
                {
                    if close.contains(*pos) {
                        self.chart.close_legend();
                        continue;
                    }
                }
                if let Some(input) = self.input.translate(event, rect, time_ms, mods) {
                    self.chart.handle_input(&input);
                }
            }
            self.chart.tick(time_ms);

            let colors = ChartColors::from_ui(ui);
            let frame = self.chart.render();
            if response.hovered() || frame.mode.is_some() {
                ctx.set_cursor_icon(cursor_for(frame.mode, frame.roi_edge_hover));
            }
            self.legend_close = paint_frame(&ui.painter_at(rect), rect.min, frame, &colors);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_follows_mode() {
        assert_eq!(cursor_for(Some(Mode::Pan), false), egui::CursorIcon::Grabbing);
        assert_eq!(cursor_for(None, true), egui::CursorIcon::ResizeHorizontal);
        assert_eq!(cursor_for(Some(Mode::ZoomX), true), egui::CursorIcon::Crosshair);
        assert_eq!(cursor_for(None, false), egui::CursorIcon::Default);
    }
}
