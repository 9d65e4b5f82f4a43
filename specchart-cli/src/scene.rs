//! Reading scenes and recorded input from disk.

use std::fs;
use std::path::Path;

use specchart_core::InputEvent;
use specchart_engine::Scene;

use crate::Result;

/// Reads a JSON scene file. Missing fields take their defaults.
pub fn load_scene(path: &Path) -> Result<Scene> {
    let text = fs::read_to_string(path)?;
    let scene: Scene = serde_json::from_str(&text)?;
    log::debug!(
        "loaded scene {} with {} spectra",
        path.display(),
        scene.spectra.len()
    );
    Ok(scene)
}

/// Reads a JSON array of input events.
pub fn load_inputs(path: &Path) -> Result<Vec<InputEvent>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
