//! Typed chart configuration.
//!
//! Every option the chart recognises lives here with its default. Options
//! are validated once when handed to the chart; an invalid set is replaced
//! by the defaults.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Mapping used for the counts axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum YScaleMode {
    #[default]
    Linear,
    Log,
    Sqrt,
}

/// Host platform, which decides the y-zoom modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Platform {
    /// Alt zooms the y axis.
    Windows,
    /// Meta (command) zooms the y axis.
    Other,
}

impl Default for Platform {
    fn default() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Other
        }
    }
}

/// Fractional padding added above and below the visible data range.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct YPadding {
    pub top: f64,
    pub bottom: f64,
}

impl YPadding {
    #[must_use]
    pub const fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }
}

/// Margins between the container edge and the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Padding {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            left: 55.0,
            right: 10.0,
            top: 10.0,
            bottom: 32.0,
        }
    }
}

/// Toggles for physics feature markers drawn at the pointer energy.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarkerOptions {
    pub compton_edge: bool,
    pub compton_peak: bool,
    /// Scattering angle for the Compton peak marker, degrees.
    pub compton_peak_angle_deg: f64,
    pub escape_peaks: bool,
    pub sum_peak: bool,
}

impl Default for MarkerOptions {
    fn default() -> Self {
        Self {
            compton_edge: false,
            compton_peak: false,
            compton_peak_angle_deg: 180.0,
            escape_peaks: false,
            sum_peak: false,
        }
    }
}

impl MarkerOptions {
    /// Whether any marker is enabled.
    #[must_use]
    pub fn any(&self) -> bool {
        self.compton_edge || self.compton_peak || self.escape_peaks || self.sum_peak
    }
}

/// Wheel zoom tunables.
///
/// The exact values are empirical; only the smooth, cursor-anchored,
/// velocity-accumulated behaviour matters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WheelOptions {
    /// Accumulated wheel delta that maps to a full zoom in or out.
    pub max_scroll_total: f64,
    /// Inactivity after which a wheel session commits.
    pub coalesce_ms: f64,
    /// Number of source channels visible at maximum wheel zoom-in.
    pub min_bins: usize,
}

impl Default for WheelOptions {
    fn default() -> Self {
        Self {
            max_scroll_total: 1500.0,
            coalesce_ms: 250.0,
            min_bins: 3,
        }
    }
}

/// Click and tap recognition thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ClickOptions {
    /// Movement below this many pixels still counts as a click.
    pub move_tolerance_px: f64,
    pub double_click_ms: f64,
    pub double_click_px: f64,
    /// Stationary single touch held this long acts as a right click.
    pub long_press_ms: f64,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            move_tolerance_px: 3.0,
            double_click_ms: 500.0,
            double_click_px: 5.0,
            long_press_ms: 600.0,
        }
    }
}

/// Every option the chart recognises.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ChartOptions {
    pub padding: Padding,
    /// Target on-screen width of one display bin.
    pub line_width_px: f64,
    pub y_scale_mode: YScaleMode,
    pub lin_padding: YPadding,
    pub log_padding: YPadding,
    pub sqrt_padding: YPadding,
    pub grid_x: bool,
    pub grid_y: bool,
    pub compact_x_axis: bool,
    /// Minimum pixel distance between labelled x ticks.
    pub x_label_spacing_px: f64,
    /// Minimum pixel distance between labelled y ticks.
    pub y_label_spacing_px: f64,
    pub show_legend: bool,
    pub show_peak_labels: bool,
    pub show_user_labels: bool,
    pub show_nuclide_names: bool,
    pub show_nuclide_energies: bool,
    pub show_reference_lines: bool,
    pub show_scaler: bool,
    /// Upper end of the scale-factor slider.
    pub scaler_max: f64,
    pub show_mouse_stats: bool,
    pub show_overview: bool,
    pub overview_height_px: f64,
    /// Vertical gap between the main plot area and the overview.
    pub overview_gap_px: f64,
    pub markers: MarkerOptions,
    pub background_subtract: bool,
    pub platform: Platform,
    /// Duration of the zoom-in animation; zero disables it.
    pub animation_duration_ms: f64,
    /// Minimum interval between host events for continuously changing
    /// quantities (ROI edge drags, scale-factor drags).
    pub host_event_interval_ms: f64,
    pub wheel: WheelOptions,
    pub click: ClickOptions,
    /// Pointer distance from a ROI edge that grabs it.
    pub roi_edge_grab_px: f64,
    /// Ctrl-drag streams `fitRoiDrag` previews instead of a single
    /// `controlkeydragged` on release.
    pub fit_roi_on_ctrl_drag: bool,
    pub label_char_width_px: f64,
    pub label_line_height_px: f64,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            padding: Padding::default(),
            line_width_px: 1.0,
            y_scale_mode: YScaleMode::Linear,
            lin_padding: YPadding::new(0.1, 0.1),
            log_padding: YPadding::new(0.05, 0.025),
            sqrt_padding: YPadding::new(0.1, 0.1),
            grid_x: false,
            grid_y: false,
            compact_x_axis: false,
            x_label_spacing_px: 60.0,
            y_label_spacing_px: 30.0,
            show_legend: true,
            show_peak_labels: false,
            show_user_labels: false,
            show_nuclide_names: false,
            show_nuclide_energies: false,
            show_reference_lines: true,
            show_scaler: false,
            scaler_max: 10.0,
            show_mouse_stats: true,
            show_overview: false,
            overview_height_px: 50.0,
            overview_gap_px: 30.0,
            markers: MarkerOptions::default(),
            background_subtract: false,
            platform: Platform::default(),
            animation_duration_ms: 0.0,
            host_event_interval_ms: 500.0,
            wheel: WheelOptions::default(),
            click: ClickOptions::default(),
            roi_edge_grab_px: 5.0,
            fit_roi_on_ctrl_drag: true,
            label_char_width_px: 6.0,
            label_line_height_px: 12.0,
        }
    }
}

impl ChartOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Padding fractions for the given y-scale mode.
    #[must_use]
    pub fn y_padding(&self, mode: YScaleMode) -> YPadding {
        match mode {
            YScaleMode::Linear => self.lin_padding,
            YScaleMode::Log => self.log_padding,
            YScaleMode::Sqrt => self.sqrt_padding,
        }
    }

    /// Sets the y-scale mode.
    #[must_use]
    pub fn with_y_scale_mode(mut self, mode: YScaleMode) -> Self {
        self.y_scale_mode = mode;
        self
    }

    /// Sets the display line width in pixels.
    #[must_use]
    pub fn with_line_width(mut self, px: f64) -> Self {
        self.line_width_px = px;
        self
    }

    /// Sets the plot margins.
    #[must_use]
    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Sets padding fractions for one y-scale mode.
    #[must_use]
    pub fn with_y_padding(mut self, mode: YScaleMode, padding: YPadding) -> Self {
        match mode {
            YScaleMode::Linear => self.lin_padding = padding,
            YScaleMode::Log => self.log_padding = padding,
            YScaleMode::Sqrt => self.sqrt_padding = padding,
        }
        self
    }

    /// Enables the overview (slider) chart.
    #[must_use]
    pub fn with_overview(mut self, height_px: f64) -> Self {
        self.show_overview = true;
        self.overview_height_px = height_px;
        self
    }

    /// Sets the background-subtract view mode.
    #[must_use]
    pub fn with_background_subtract(mut self, enabled: bool) -> Self {
        self.background_subtract = enabled;
        self
    }

    /// Sets the platform used for modifier mapping.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Sets the zoom animation duration.
    #[must_use]
    pub fn with_animation_duration(mut self, ms: f64) -> Self {
        self.animation_duration_ms = ms;
        self
    }

    /// Sets the feature marker toggles.
    #[must_use]
    pub fn with_markers(mut self, markers: MarkerOptions) -> Self {
        self.markers = markers;
        self
    }

    /// Enables the scale-factor slider widget.
    #[must_use]
    pub fn with_scaler(mut self, enabled: bool) -> Self {
        self.show_scaler = enabled;
        self
    }

    /// Checks numeric options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOption`] naming the first offending option.
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, what: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::InvalidOption(what.to_string()))
            }
        }
        let finite_non_negative = |v: f64| v.is_finite() && v >= 0.0;

        check(
            self.line_width_px.is_finite() && self.line_width_px > 0.0,
            "line_width_px must be positive",
        )?;
        let p = self.padding;
        check(
            [p.left, p.right, p.top, p.bottom]
                .into_iter()
                .all(finite_non_negative),
            "padding must be non-negative",
        )?;
        for (name, pad) in [
            ("lin_padding", self.lin_padding),
            ("log_padding", self.log_padding),
            ("sqrt_padding", self.sqrt_padding),
        ] {
            check(
                finite_non_negative(pad.top) && finite_non_negative(pad.bottom),
                &format!("{name} fractions must be non-negative"),
            )?;
        }
        check(
            self.x_label_spacing_px > 0.0 && self.y_label_spacing_px > 0.0,
            "label spacing must be positive",
        )?;
        check(
            self.scaler_max.is_finite() && self.scaler_max > 0.0,
            "scaler_max must be positive",
        )?;
        check(
            finite_non_negative(self.overview_height_px) && finite_non_negative(self.overview_gap_px),
            "overview geometry must be non-negative",
        )?;
        check(
            finite_non_negative(self.animation_duration_ms)
                && finite_non_negative(self.host_event_interval_ms),
            "durations must be non-negative",
        )?;
        check(
            self.wheel.max_scroll_total > 0.0
                && finite_non_negative(self.wheel.coalesce_ms)
                && self.wheel.min_bins >= 1,
            "wheel options out of range",
        )?;
        check(
            finite_non_negative(self.click.move_tolerance_px)
                && finite_non_negative(self.click.double_click_ms)
                && finite_non_negative(self.click.double_click_px)
                && finite_non_negative(self.click.long_press_ms),
            "click thresholds must be non-negative",
        )?;
        check(
            finite_non_negative(self.roi_edge_grab_px),
            "roi_edge_grab_px must be non-negative",
        )?;
        check(
            self.label_char_width_px > 0.0 && self.label_line_height_px > 0.0,
            "label metrics must be positive",
        )?;
        check(
            self.markers.compton_peak_angle_deg.is_finite(),
            "compton peak angle must be finite",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ChartOptions::default().validate().is_ok());
    }

    #[test]
    fn test_builder_and_padding_lookup() {
        let opts = ChartOptions::new()
            .with_y_scale_mode(YScaleMode::Log)
            .with_y_padding(YScaleMode::Log, YPadding::new(0.2, 0.3))
            .with_line_width(2.0);
        assert_eq!(opts.y_scale_mode, YScaleMode::Log);
        assert_eq!(opts.y_padding(YScaleMode::Log), YPadding::new(0.2, 0.3));
        assert_eq!(opts.y_padding(YScaleMode::Linear), YPadding::new(0.1, 0.1));
        assert!((opts.line_width_px - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let opts = ChartOptions::new().with_line_width(0.0);
        assert!(matches!(opts.validate(), Err(Error::InvalidOption(_))));

        let mut opts = ChartOptions::new();
        opts.wheel.min_bins = 0;
        assert!(opts.validate().is_err());

        let mut opts = ChartOptions::new();
        opts.lin_padding.top = f64::NAN;
        assert!(opts.validate().is_err());
    }
}
