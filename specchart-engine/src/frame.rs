//! Paint-ready output of the render pipeline.
//!
//! A [`Frame`] holds nothing but pixel geometry and text. All coordinates
//! are plot-local (origin at the top-left of the plot area) unless a field
//! says otherwise; the paint phase only needs [`Layout::plot`] to place them.

#[cfg(feature = "serde")]
use serde::Serialize;

use specchart_core::{Color, SpectrumType, YScaleMode};

use crate::geometry::{PlacedLabel, RoiPaths};
use crate::gesture::{Mode, Overlay};
use crate::layout::Layout;
use crate::markers::FeatureMarker;
use crate::overlays::{ReferenceLineGeometry, ShadedBand};
use crate::overview::OverviewFrame;
use crate::path::Path;
use crate::scaler::ScalerSlider;
use crate::ticks::Tick;

/// The step polyline of one spectrum.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SpectrumLine {
    pub spectrum_type: SpectrumType,
    pub title: String,
    pub color: Option<Color>,
    pub bin_factor: usize,
    pub point_count: usize,
    /// Drawn from background-subtracted points.
    pub background_subtracted: bool,
    pub path: Path,
}

/// A ROI with its geometry and colors.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct RoiOverlay {
    pub spectrum_type: SpectrumType,
    pub roi_index: usize,
    pub lower_energy: f64,
    pub upper_energy: f64,
    pub paths: RoiPaths,
    /// Fill color per entry of `paths.peak_order`.
    pub peak_colors: Vec<Option<Color>>,
}

/// One row of the legend.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct LegendEntry {
    pub spectrum_type: SpectrumType,
    pub title: String,
    pub color: Option<Color>,
    /// Live time, real time, neutron count and scale factor, when known.
    pub details: Vec<String>,
}

/// Readout under a hovering pointer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct HoverInfo {
    pub x_px: f64,
    pub y_px: f64,
    pub energy: f64,
    /// Scaled counts of every spectrum at `energy`.
    pub counts: Vec<(SpectrumType, f64)>,
    /// Mouse-stats text, empty when disabled.
    pub text: Vec<String>,
}

/// Everything the paint phase draws.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Frame {
    /// Container-space areas.
    pub layout: Layout,
    pub x_domain: (f64, f64),
    pub y_domain: (f64, f64),
    pub y_mode: YScaleMode,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    /// Pixel columns of vertical grid lines.
    pub grid_x: Vec<f64>,
    /// Pixel rows of horizontal grid lines.
    pub grid_y: Vec<f64>,
    pub lines: Vec<SpectrumLine>,
    pub rois: Vec<RoiOverlay>,
    pub labels: Vec<PlacedLabel>,
    pub reference_lines: Vec<ReferenceLineGeometry>,
    /// Index into `reference_lines` of the line under the pointer.
    pub hovered_reference: Option<usize>,
    pub markers: Vec<FeatureMarker>,
    pub search_windows: Vec<ShadedBand>,
    pub highlights: Vec<ShadedBand>,
    pub overlay: Option<Overlay>,
    pub overview: Option<OverviewFrame>,
    pub scalers: Vec<ScalerSlider>,
    pub legend: Option<Vec<LegendEntry>>,
    pub hover: Option<HoverInfo>,
    /// The pointer is over a draggable ROI edge.
    pub roi_edge_hover: bool,
    pub mode: Option<Mode>,
}

impl Frame {
    /// Line of the given spectrum type, if drawn.
    #[must_use]
    pub fn line(&self, spectrum_type: SpectrumType) -> Option<&SpectrumLine> {
        self.lines.iter().find(|l| l.spectrum_type == spectrum_type)
    }

    /// Labels of every major x tick, in order.
    #[must_use]
    pub fn x_labels(&self) -> Vec<&str> {
        self.x_ticks.iter().filter_map(|t| t.label.as_deref()).collect()
    }

    /// Labels of every major y tick, in order.
    #[must_use]
    pub fn y_labels(&self) -> Vec<&str> {
        self.y_ticks.iter().filter_map(|t| t.label.as_deref()).collect()
    }
}
