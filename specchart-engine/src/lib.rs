//! specchart-engine: the interactive part of a gamma spectrum chart.
//!
//! The engine turns spectra, ROIs and input events into paint-ready
//! [`Frame`]s and host notifications. It is split into:
//!
//! - **Scale Manager** ([`scale`]) - energy and counts to pixel transforms
//! - **Rebinning Engine** ([`rebin`]) - channel grouping for the visible domain
//! - **Gesture/Mode State Machine** ([`gesture`]) - pointer, touch and wheel input
//! - **ROI/Peak Geometry Engine** ([`geometry`]) - continuum, peak and label geometry
//! - **Overview chart** ([`overview`]) - full-range miniature with a draggable selection
//!
//! [`SpectrumChart`] ties them together behind the host-facing API. Nothing
//! here draws; a front end paints the [`Frame`] however it likes.

pub mod animation;
mod chart;
pub mod frame;
pub mod geometry;
pub mod gesture;
pub mod layout;
pub mod markers;
pub mod overlays;
pub mod overview;
pub mod path;
pub mod rebin;
pub mod scale;
pub mod scaler;
pub mod scene;
pub mod throttle;
pub mod ticks;

pub use chart::SpectrumChart;
pub use frame::{Frame, HoverInfo, LegendEntry, RoiOverlay, SpectrumLine};
pub use gesture::{Mode, Overlay, OverlayKind};
pub use layout::Layout;
pub use path::{Path, PixelPoint, Rect};
pub use rebin::RebinState;
pub use scale::{LinearScale, ScaleManager, YScale};
pub use scene::Scene;

// Re-export the data model so hosts need only one dependency.
pub use specchart_core as core;
