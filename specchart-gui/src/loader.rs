//! Background scene loading.

use std::fs;
use std::path::Path;
use std::sync::mpsc::Sender;
use std::time::Instant;

use anyhow::Context;
use specchart_engine::Scene;

use crate::message::AppMessage;

/// Reads, parses and validates a scene file.
pub fn read_scene(path: &Path) -> anyhow::Result<Scene> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let scene: Scene = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    scene.validate().context("validating scene")?;
    Ok(scene)
}

/// Worker body: loads `path` and reports the outcome on `tx`.
pub fn load_scene_worker(path: &Path, tx: &Sender<AppMessage>) {
    let start = Instant::now();
    let msg = match read_scene(path) {
        Ok(scene) => {
            log::info!(
                "loaded {} ({} spectra) in {:?}",
                path.display(),
                scene.spectra.len(),
                start.elapsed()
            );
            AppMessage::LoadComplete(path.to_path_buf(), Box::new(scene), start.elapsed())
        }
        Err(e) => {
            log::warn!("failed to load {}: {e:#}", path.display());
            AppMessage::LoadError(format!("{e:#}"))
        }
    };
    let _ = tx.send(msg);
}
