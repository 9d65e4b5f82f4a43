//! specchart: headless driver for the gamma spectrum chart engine.
//!
//! Builds a chart from a JSON scene, renders it, optionally replays recorded
//! input, and prints what a host would see.
#![allow(clippy::uninlined_format_args, clippy::cast_precision_loss)]

mod scene;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use specchart_core::{HostEvent, SpectrumType};
use specchart_engine::{Frame, Scene, SpectrumChart};
use thiserror::Error;

use crate::scene::{load_inputs, load_scene};

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid scene: {0}")]
    Core(#[from] specchart_core::Error),
}

/// Headless gamma spectrum chart.
#[derive(Parser)]
#[command(name = "specchart")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one frame of a scene and print a summary
    Render {
        /// Scene JSON file
        scene: PathBuf,

        /// Container width in pixels (overrides the scene)
        #[arg(long)]
        width: Option<f64>,

        /// Container height in pixels (overrides the scene)
        #[arg(long)]
        height: Option<f64>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print the whole frame instead of a summary
        #[arg(long)]
        full: bool,
    },

    /// Feed recorded input through a scene and print the host events
    Replay {
        /// Scene JSON file
        scene: PathBuf,

        /// JSON array of input events
        inputs: PathBuf,

        /// Print the final frame summary after the events
        #[arg(long)]
        summary: bool,
    },

    /// Validate a scene and describe its spectra
    Info {
        /// Scene JSON file
        scene: PathBuf,
    },
}

/// Condensed view of a rendered frame.
#[derive(Debug, Serialize)]
struct FrameSummary {
    x_domain: (f64, f64),
    y_domain: (f64, f64),
    y_mode: String,
    plot: (f64, f64, f64, f64),
    x_labels: Vec<String>,
    y_labels: Vec<String>,
    lines: Vec<LineSummary>,
    rois: Vec<RoiSummary>,
    labels: usize,
    reference_lines: usize,
    overview: bool,
}

#[derive(Debug, Serialize)]
struct LineSummary {
    spectrum_type: SpectrumType,
    bin_factor: usize,
    points: usize,
    path_len: usize,
    background_subtracted: bool,
}

#[derive(Debug, Serialize)]
struct RoiSummary {
    spectrum_type: SpectrumType,
    lower_energy: f64,
    upper_energy: f64,
    continuum_points: usize,
    peak_fills: Vec<usize>,
}

impl FrameSummary {
    fn new(frame: &Frame) -> Self {
        let plot = frame.layout.plot;
        Self {
            x_domain: frame.x_domain,
            y_domain: frame.y_domain,
            y_mode: format!("{:?}", frame.y_mode),
            plot: (plot.x, plot.y, plot.width, plot.height),
            x_labels: frame.x_labels().into_iter().map(str::to_string).collect(),
            y_labels: frame.y_labels().into_iter().map(str::to_string).collect(),
            lines: frame
                .lines
                .iter()
                .map(|l| LineSummary {
                    spectrum_type: l.spectrum_type,
                    bin_factor: l.bin_factor,
                    points: l.point_count,
                    path_len: l.path.len(),
                    background_subtracted: l.background_subtracted,
                })
                .collect(),
            rois: frame
                .rois
                .iter()
                .map(|r| RoiSummary {
                    spectrum_type: r.spectrum_type,
                    lower_energy: r.lower_energy,
                    upper_energy: r.upper_energy,
                    continuum_points: r.paths.continuum_path.len(),
                    peak_fills: r.paths.peak_fill_paths.iter().map(Vec::len).collect(),
                })
                .collect(),
            labels: frame.labels.len(),
            reference_lines: frame.reference_lines.len(),
            overview: frame.overview.is_some(),
        }
    }
}

/// One line of `replay` output.
#[derive(Debug, Serialize)]
struct EventLine<'a> {
    name: &'static str,
    #[serde(flatten)]
    event: &'a HostEvent,
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}

fn render(chart: &mut SpectrumChart, pretty: bool, full: bool) -> Result<String> {
    let frame = chart.render();
    if full {
        to_json(frame, pretty)
    } else {
        to_json(&FrameSummary::new(frame), pretty)
    }
}

/// Runs `inputs` through the chart and returns the emitted events in order.
fn replay(chart: &mut SpectrumChart, inputs: &[specchart_core::InputEvent]) -> Vec<HostEvent> {
    let mut events = Vec::new();
    chart.render();
    for input in inputs {
        chart.handle_input(input);
        chart.flush_to(&mut events);
    }
    chart.render();
    chart.flush_to(&mut events);
    events
}

fn info(scene: &Scene) -> String {
    let mut out = format!(
        "Scene: {} x {} px, {} spectra, {} reference line set(s)\n",
        scene.width,
        scene.height,
        scene.spectra.len(),
        scene.reference_lines.len()
    );
    for spectrum in &scene.spectra {
        let title = if spectrum.title.is_empty() {
            "(untitled)"
        } else {
            spectrum.title.as_str()
        };
        out.push_str(&format!(
            "  {:<10} {}: {} channels, {:.2} - {:.2} keV, {:.0} counts, {} ROI(s), scale {:.3}\n",
            spectrum.spectrum_type.as_str(),
            title,
            spectrum.num_channels(),
            spectrum.lower_energy(),
            spectrum.upper_energy(),
            spectrum.total_counts(),
            spectrum.rois.len(),
            spectrum.y_scale_factor
        ));
        if let (Some(live), Some(real)) = (spectrum.live_time, spectrum.real_time) {
            out.push_str(&format!("             live {live:.1} s, real {real:.1} s\n"));
        }
    }
    out
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            scene,
            width,
            height,
            pretty,
            full,
        } => {
            let scene = load_scene(&scene)?;
            let mut chart = scene.build((width, height));
            println!("{}", render(&mut chart, pretty, full)?);
        }
        Commands::Replay {
            scene,
            inputs,
            summary,
        } => {
            let scene = load_scene(&scene)?;
            let inputs = load_inputs(&inputs)?;
            let mut chart = scene.build((None, None));
            let events = replay(&mut chart, &inputs);
            log::info!("{} input(s) produced {} event(s)", inputs.len(), events.len());
            for event in &events {
                let line = EventLine {
                    name: event.name(),
                    event,
                };
                println!("{}", serde_json::to_string(&line)?);
            }
            if summary {
                println!("{}", render(&mut chart, false, false)?);
            }
        }
        Commands::Info { scene } => {
            let scene = load_scene(&scene)?;
            scene.validate()?;
            print!("{}", info(&scene));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use specchart_core::{InputEvent, PointerEvent, Spectrum};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn scene_file(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(json.as_bytes()).expect("write scene");
        file
    }

    #[test]
    fn test_scene_defaults_fill_missing_fields() {
        let file = scene_file(r#"{"spectra": [{"x": [0, 1, 2, 3], "y": [5, 6, 7, 8]}]}"#);
        let scene = load_scene(file.path()).expect("scene");
        assert_eq!(scene.width, 800.0);
        assert_eq!(scene.spectra.len(), 1);
        assert_eq!(scene.spectra[0].spectrum_type, SpectrumType::Foreground);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_render_summary_reports_lines() {
        let scene = Scene {
            width: 600.0,
            height: 300.0,
            spectra: vec![Spectrum::from_counts(vec![4.0; 2048])],
            ..Scene::default()
        };
        let mut chart = scene.build((None, None));
        let json = render(&mut chart, false, false).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["lines"][0]["spectrum_type"], "FOREGROUND");
        assert!(value["lines"][0]["bin_factor"].as_u64().unwrap_or(0) >= 4);
        assert_eq!(value["x_domain"][1], 2048.0);
    }

    #[test]
    fn test_invalid_spectrum_fails_info() {
        let file = scene_file(r#"{"spectra": [{"x": [0, 2, 1], "y": [1, 1, 1]}]}"#);
        let scene = load_scene(file.path()).expect("scene parses");
        assert!(scene.validate().is_err());
        assert!(info(&scene).contains("3 channels"));
    }

    #[test]
    fn test_replay_collects_click() {
        let scene = Scene {
            width: 600.0,
            height: 300.0,
            spectra: vec![Spectrum::from_counts(vec![4.0; 512])],
            ..Scene::default()
        };
        let mut chart = scene.build((None, None));
        let plot = chart.layout().plot;
        let (x, y) = (plot.x + plot.width / 2.0, plot.y + plot.height / 2.0);
        let inputs = vec![
            InputEvent::PointerDown(PointerEvent::at(x, y, 0.0)),
            InputEvent::PointerUp(PointerEvent::at(x, y, 20.0)),
        ];
        let events = replay(&mut chart, &inputs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name(), "leftclicked");
    }

    #[test]
    fn test_malformed_inputs_are_reported() {
        let file = scene_file(r#"[{"kind": "pointer_sideways"}]"#);
        assert!(matches!(load_inputs(file.path()), Err(CliError::Json(_))));
    }
}
