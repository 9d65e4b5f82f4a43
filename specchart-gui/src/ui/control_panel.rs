//! Control panel (left sidebar) rendering.

use eframe::egui;
use rfd::FileDialog;
use specchart_core::{SpectrumType, YScaleMode};

use super::theme::{primary_button, section_header, stat_label, stat_value};
use crate::app::SpecchartApp;

/// Checkbox that reports the new value only when the user changed it.
fn toggle(ui: &mut egui::Ui, label: &str, value: bool) -> Option<bool> {
    let mut v = value;
    ui.checkbox(&mut v, label).changed().then_some(v)
}

fn stat_row(ui: &mut egui::Ui, label: &str, value: &str) {
    ui.horizontal(|ui| {
        ui.label(stat_label(label));
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(stat_value(value));
        });
    });
}

impl SpecchartApp {
    /// Render the left sidebar.
    pub(crate) fn render_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("control_panel")
            .resizable(false)
            .exact_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.render_file_section(ui);
                    ui.separator();
                    self.render_axis_section(ui);
                    ui.separator();
                    self.render_overlay_section(ui);
                    ui.separator();
                    self.render_marker_section(ui);
                    ui.separator();
                    self.render_spectrum_stats(ui);
                });
            });
    }

    fn render_file_section(&mut self, ui: &mut egui::Ui) {
        ui.label(section_header("Scene"));
        ui.horizontal(|ui| {
            let open = ui.add_enabled(!self.is_loading, primary_button("Open..."));
            if open.clicked() {
                if let Some(path) = FileDialog::new().add_filter("Scene", &["json"]).pick_file()
                {
                    self.load_file(path);
                }
            }
            if ui.button("Demo").clicked() {
                *self = Self::default();
            }
        });
        let name = self
            .scene_path
            .as_deref()
            .and_then(|p| p.file_name())
            .map_or_else(|| "demo".to_string(), |n| n.to_string_lossy().into_owned());
        stat_row(ui, "File", &name);
        ui.label(stat_label(&self.status_text));
    }

    fn render_axis_section(&mut self, ui: &mut egui::Ui) {
        ui.label(section_header("Axes"));
        let mut mode = self.chart.y_scale_mode();
        ui.horizontal(|ui| {
            ui.selectable_value(&mut mode, YScaleMode::Linear, "Linear");
            ui.selectable_value(&mut mode, YScaleMode::Sqrt, "Sqrt");
            ui.selectable_value(&mut mode, YScaleMode::Log, "Log");
        });
        if mode != self.chart.y_scale_mode() {
            self.chart.set_y_scale_mode(mode);
        }

        let opts = self.chart.options().clone();
        if let Some(v) = toggle(ui, "Grid X", opts.grid_x) {
            self.chart.set_grid_x(v);
        }
        if let Some(v) = toggle(ui, "Grid Y", opts.grid_y) {
            self.chart.set_grid_y(v);
        }
        if let Some(v) = toggle(ui, "Compact x axis", opts.compact_x_axis) {
            self.chart.set_compact_x_axis(v);
        }
        if let Some(v) = toggle(ui, "Overview", opts.show_overview) {
            self.chart.set_show_overview(v);
        }

        let (lo, hi) = self.chart.x_domain();
        stat_row(ui, "Range", &format!("{lo:.1} - {hi:.1} keV"));
        if ui.button("Reset zoom").clicked() {
            if let Some((min, max)) = self.chart.data_bounds() {
                self.chart.set_x_axis_range(min, max, true);
            }
        }
    }

    fn render_overlay_section(&mut self, ui: &mut egui::Ui) {
        ui.label(section_header("Overlays"));
        let opts = self.chart.options().clone();
        if let Some(v) = toggle(ui, "Legend", opts.show_legend) {
            self.chart.set_show_legend(v);
        }
        if let Some(v) = toggle(ui, "Peak labels", opts.show_peak_labels) {
            self.chart.set_show_peak_labels(v);
        }
        if let Some(v) = toggle(ui, "User labels", opts.show_user_labels) {
            self.chart.set_show_user_labels(v);
        }
        if let Some(v) = toggle(ui, "Nuclide names", opts.show_nuclide_names) {
            self.chart.set_show_nuclide_names(v);
        }
        if let Some(v) = toggle(ui, "Nuclide energies", opts.show_nuclide_energies) {
            self.chart.set_show_nuclide_energies(v);
        }
        if let Some(v) = toggle(ui, "Reference lines", opts.show_reference_lines) {
            self.chart.set_show_reference_lines(v);
        }
        if let Some(v) = toggle(ui, "Scale sliders", opts.show_scaler) {
            self.chart.set_show_scaler(v);
        }
        if let Some(v) = toggle(ui, "Mouse stats", opts.show_mouse_stats) {
            self.chart.set_show_mouse_stats(v);
        }
        if let Some(v) = toggle(ui, "Subtract background", opts.background_subtract) {
            self.chart.set_background_subtract(v);
        }
    }

    fn render_marker_section(&mut self, ui: &mut egui::Ui) {
        ui.label(section_header("Markers"));
        let mut markers = self.chart.options().markers;
        let before = markers;
        ui.checkbox(&mut markers.compton_edge, "Compton edge");
        ui.horizontal(|ui| {
            ui.checkbox(&mut markers.compton_peak, "Compton peak");
            ui.add_enabled(
                markers.compton_peak,
                egui::DragValue::new(&mut markers.compton_peak_angle_deg)
                    .range(0.0..=180.0)
                    .suffix("°"),
            );
        });
        ui.checkbox(&mut markers.escape_peaks, "Escape peaks");
        ui.checkbox(&mut markers.sum_peak, "Sum peak");
        if markers != before {
            self.chart.set_markers(markers);
        }
        if let Some(anchor) = self.chart.sum_anchor() {
            stat_row(ui, "Sum anchor", &format!("{anchor:.1} keV"));
        }
    }

    fn render_spectrum_stats(&self, ui: &mut egui::Ui) {
        ui.label(section_header("Spectra"));
        for spectrum_type in [
            SpectrumType::Foreground,
            SpectrumType::Background,
            SpectrumType::Secondary,
        ] {
            let Some(spectrum) = self.chart.spectrum(spectrum_type) else {
                continue;
            };
            ui.label(egui::RichText::new(spectrum_type.as_str()).strong());
            stat_row(ui, "Channels", &spectrum.num_channels().to_string());
            stat_row(ui, "Counts", &format!("{:.0}", spectrum.total_counts()));
            if let Some(live) = spectrum.live_time {
                stat_row(ui, "Live time", &format!("{live:.1} s"));
            }
            if spectrum_type != SpectrumType::Foreground {
                stat_row(ui, "Scale", &format!("{:.3}", spectrum.y_scale_factor));
            }
            stat_row(ui, "ROIs", &spectrum.rois.len().to_string());
        }
    }
}
