//! Application theme and chart colors.
//!
//! Light and dark widget styles with monospace fonts, following the system
//! preference, plus the palette the chart painter draws with.

use std::sync::atomic::{AtomicBool, Ordering};

use eframe::egui::{
    self, Color32, FontFamily, FontId, Rounding, Stroke, TextStyle, Theme, Visuals,
};
use specchart_core::{Color, SpectrumType};

/// Color palette for the application (dark theme).
pub mod dark {
    use eframe::egui::Color32;

    pub const BG_DARK: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0x1f, 0x1f, 0x1f);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0x2a, 0x2a, 0x2a);
    pub const BORDER: Color32 = Color32::from_rgb(0x33, 0x33, 0x33);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0x44, 0x44, 0x44);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0xe0, 0xe0, 0xe0);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x88, 0x88, 0x88);
    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0x3a, 0x3a, 0x3a);
}

/// Color palette for the application (light theme).
pub mod light {
    use eframe::egui::Color32;

    pub const BG_DARK: Color32 = Color32::from_rgb(0xf5, 0xf5, 0xf5);
    pub const BG_PANEL: Color32 = Color32::from_rgb(0xff, 0xff, 0xff);
    pub const BG_INPUT: Color32 = Color32::from_rgb(0xf0, 0xf0, 0xf0);
    pub const BORDER: Color32 = Color32::from_rgb(0xd0, 0xd0, 0xd0);
    pub const BORDER_LIGHT: Color32 = Color32::from_rgb(0xc0, 0xc0, 0xc0);
    pub const TEXT_PRIMARY: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
    pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x66, 0x66, 0x66);
    pub const BUTTON_HOVER: Color32 = Color32::from_rgb(0xdd, 0xdd, 0xdd);
}

/// Shared accent colors (same for both themes).
pub mod accent {
    use eframe::egui::Color32;

    pub const BLUE: Color32 = Color32::from_rgb(0x4a, 0x9e, 0xff);
    pub const GREEN: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
    pub const RED: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
    pub const AMBER: Color32 = Color32::from_rgb(0xf5, 0x9e, 0x0b);
}

/// Theme-aware colors for painting the chart.
#[derive(Clone, Copy)]
pub struct ChartColors {
    pub background: Color32,
    pub axis: Color32,
    pub grid: Color32,
    pub text: Color32,
    pub text_muted: Color32,
    pub foreground: Color32,
    pub background_spectrum: Color32,
    pub secondary: Color32,
    pub continuum: Color32,
    pub peak_fill: Color32,
    pub marker: Color32,
    pub selection: Color32,
}

impl ChartColors {
    /// Get colors for the current theme from UI.
    pub fn from_ui(ui: &egui::Ui) -> Self {
        Self::from_dark_mode(ui.visuals().dark_mode)
    }

    pub fn from_dark_mode(is_dark: bool) -> Self {
        if is_dark {
            Self {
                background: dark::BG_DARK,
                axis: dark::TEXT_MUTED,
                grid: dark::BORDER,
                text: dark::TEXT_PRIMARY,
                text_muted: dark::TEXT_MUTED,
                foreground: accent::BLUE,
                background_spectrum: accent::RED,
                secondary: accent::GREEN,
                continuum: dark::TEXT_MUTED,
                peak_fill: accent::AMBER.gamma_multiply(0.35),
                marker: accent::AMBER,
                selection: accent::BLUE.gamma_multiply(0.25),
            }
        } else {
            Self {
                background: light::BG_PANEL,
                axis: light::TEXT_MUTED,
                grid: light::BORDER,
                text: light::TEXT_PRIMARY,
                text_muted: light::TEXT_MUTED,
                foreground: to_color32(Color::STEEL_BLUE),
                background_spectrum: to_color32(Color::FIREBRICK),
                secondary: to_color32(Color::DARK_GREEN),
                continuum: light::TEXT_MUTED,
                peak_fill: accent::AMBER.gamma_multiply(0.3),
                marker: accent::AMBER,
                selection: accent::BLUE.gamma_multiply(0.2),
            }
        }
    }

    /// Line color of a spectrum, preferring the color the data carries.
    pub fn spectrum(&self, spectrum_type: SpectrumType, custom: Option<Color>) -> Color32 {
        custom.map_or_else(
            || match spectrum_type {
                SpectrumType::Foreground => self.foreground,
                SpectrumType::Background => self.background_spectrum,
                SpectrumType::Secondary => self.secondary,
            },
            to_color32,
        )
    }
}

/// Converts a data-model color.
pub fn to_color32(c: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Configure egui style for the given theme.
pub fn configure_style_for_theme(ctx: &egui::Context, theme: Theme) {
    let visuals = match theme {
        Theme::Dark => build_visuals(Visuals::dark(), true),
        Theme::Light => build_visuals(Visuals::light(), false),
    };

    ctx.set_visuals(visuals);
    configure_fonts_and_spacing(ctx);
}

/// Configure style based on current visuals (dark/light mode).
pub fn configure_style(ctx: &egui::Context) {
    let is_dark = ctx.style().visuals.dark_mode;
    let theme = if is_dark { Theme::Dark } else { Theme::Light };
    configure_style_for_theme(ctx, theme);
}

fn build_visuals(mut visuals: Visuals, is_dark: bool) -> Visuals {
    let (panel, faint, input, border, border_light, text, muted, hover) = if is_dark {
        (
            dark::BG_PANEL,
            dark::BG_DARK,
            dark::BG_INPUT,
            dark::BORDER,
            dark::BORDER_LIGHT,
            dark::TEXT_PRIMARY,
            dark::TEXT_MUTED,
            dark::BUTTON_HOVER,
        )
    } else {
        (
            light::BG_PANEL,
            light::BG_DARK,
            light::BG_INPUT,
            light::BORDER,
            light::BORDER_LIGHT,
            light::TEXT_PRIMARY,
            light::TEXT_MUTED,
            light::BUTTON_HOVER,
        )
    };

    visuals.window_fill = panel;
    visuals.panel_fill = panel;
    visuals.faint_bg_color = faint;
    visuals.extreme_bg_color = input;

    let rounding = Rounding::same(4.0);
    let widgets = &mut visuals.widgets;
    widgets.noninteractive.bg_fill = input;
    widgets.noninteractive.fg_stroke = Stroke::new(1.0, muted);
    widgets.noninteractive.bg_stroke = Stroke::new(1.0, border);
    widgets.noninteractive.rounding = rounding;

    widgets.inactive.bg_fill = input;
    widgets.inactive.fg_stroke = Stroke::new(1.0, text);
    widgets.inactive.bg_stroke = Stroke::new(1.0, border_light);
    widgets.inactive.rounding = rounding;

    widgets.hovered.bg_fill = hover;
    widgets.hovered.fg_stroke = Stroke::new(1.0, text);
    widgets.hovered.bg_stroke = Stroke::new(1.0, accent::BLUE);
    widgets.hovered.rounding = rounding;

    widgets.active.bg_fill = accent::BLUE;
    widgets.active.fg_stroke = Stroke::new(1.0, Color32::WHITE);
    widgets.active.bg_stroke = Stroke::new(1.0, accent::BLUE);
    widgets.active.rounding = rounding;

    widgets.open.bg_fill = input;
    widgets.open.fg_stroke = Stroke::new(1.0, text);
    widgets.open.bg_stroke = Stroke::new(1.0, border_light);
    widgets.open.rounding = rounding;

    visuals.selection.bg_fill = accent::BLUE.gamma_multiply(if is_dark { 0.3 } else { 0.2 });
    visuals.selection.stroke = Stroke::new(1.0, accent::BLUE);

    visuals
}

/// Configure fonts and spacing (theme-independent).
fn configure_fonts_and_spacing(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    style.text_styles = [
        (TextStyle::Small, FontId::new(10.0, FontFamily::Monospace)),
        (TextStyle::Body, FontId::new(12.0, FontFamily::Monospace)),
        (TextStyle::Button, FontId::new(12.0, FontFamily::Monospace)),
        (TextStyle::Heading, FontId::new(14.0, FontFamily::Monospace)),
        (
            TextStyle::Monospace,
            FontId::new(12.0, FontFamily::Monospace),
        ),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(8.0, 6.0);
    style.spacing.button_padding = egui::vec2(10.0, 6.0);
    style.spacing.indent = 16.0;

    ctx.set_style(style);
}

/// Style a button as the primary action button.
pub fn primary_button(text: &str) -> egui::Button<'_> {
    egui::Button::new(egui::RichText::new(text).color(Color32::WHITE))
        .fill(accent::GREEN)
        .rounding(Rounding::same(4.0))
}

/// Create a section header label.
pub fn section_header(text: &str) -> egui::RichText {
    egui::RichText::new(text.to_uppercase()).size(11.0).strong()
}

/// Create a stat label (left column).
pub fn stat_label(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(11.0).weak()
}

/// Create a stat value (right column).
pub fn stat_value(text: &str) -> egui::RichText {
    egui::RichText::new(text).size(11.0)
}

static LAST_DARK_MODE: AtomicBool = AtomicBool::new(true);
static THEME_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Apply the current system theme, re-applying styles if the theme changed.
pub fn apply_system_theme(ctx: &egui::Context) {
    let is_dark = ctx.style().visuals.dark_mode;
    let was_initialized = THEME_INITIALIZED.swap(true, Ordering::Relaxed);
    let last_dark = LAST_DARK_MODE.swap(is_dark, Ordering::Relaxed);

    if !was_initialized || last_dark != is_dark {
        let theme = if is_dark { Theme::Dark } else { Theme::Light };
        configure_style_for_theme(ctx, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_line_color_wins() {
        let colors = ChartColors::from_dark_mode(true);
        let custom = Color::rgb(1, 2, 3);
        assert_eq!(
            colors.spectrum(SpectrumType::Background, Some(custom)),
            Color32::from_rgb(1, 2, 3)
        );
        assert_eq!(
            colors.spectrum(SpectrumType::Secondary, None),
            colors.secondary
        );
    }
}
