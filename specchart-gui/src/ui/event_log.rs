//! Event log (bottom panel) rendering.

use eframe::egui;

use super::theme::{section_header, stat_label};
use crate::app::SpecchartApp;

impl SpecchartApp {
    /// Render the list of notifications the chart emitted, newest last.
    pub(crate) fn render_event_log(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("event_log")
            .resizable(true)
            .default_height(140.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(section_header("Events"));
                    if ui.small_button("Clear").clicked() {
                        self.events.clear();
                    }
                });
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for event in &self.events {
                            ui.horizontal(|ui| {
                                ui.label(stat_label(&format!("{:>8.2}s", event.time_s)));
                                ui.label(egui::RichText::new(event.name).strong());
                                ui.label(&event.detail);
                            });
                        }
                    });
            });
    }
}
