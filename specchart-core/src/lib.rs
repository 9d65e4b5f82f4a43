//! specchart-core: data model for the specchart gamma spectrum chart.
//!
//! This crate holds the types exchanged between a host application and the
//! chart engine: spectra, ROIs and peaks, reference-line overlays, typed
//! options, input events, and outbound host events.
//!

pub mod color;
pub mod error;
pub mod event;
pub mod input;
pub mod options;
pub mod reference;
pub mod roi;
pub mod spectrum;

pub use color::Color;
pub use error::{Error, Result};
pub use event::{EventArg, HostEvent, HostSink};
pub use input::{
    InputEvent, Key, Modifiers, PointerButton, PointerEvent, TouchEvent, TouchPoint, WheelEvent,
};
pub use options::{
    ChartOptions, ClickOptions, MarkerOptions, Padding, Platform, WheelOptions, YPadding,
    YScaleMode,
};
pub use reference::{HighlightRegion, ReferenceLine, ReferenceLineSet, SearchWindow};
pub use roi::{ContinuumType, NuclideRef, Peak, PeakType, Roi};
pub use spectrum::{DisplayPoint, Spectrum, SpectrumType};
