//! UI rendering modules.
//!
//! - `control_panel`: left sidebar with file, scale and overlay controls
//! - `chart_view`: central panel hosting the chart widget
//! - `event_log`: bottom panel listing chart notifications
//! - `painter`: draws a rendered frame with egui shapes

mod chart_view;
mod control_panel;
mod event_log;
mod painter;
pub mod theme;
