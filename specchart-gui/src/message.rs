//! Application message types for async communication.
//!
//! Scene files are parsed on a worker thread; results come back to the UI
//! thread over a channel.

use std::path::PathBuf;
use std::time::Duration;

use specchart_engine::Scene;

/// Messages sent from background workers to the UI thread.
pub enum AppMessage {
    /// Scene parsed and validated.
    LoadComplete(PathBuf, Box<Scene>, Duration),

    /// Scene could not be read or is invalid.
    LoadError(String),
}
