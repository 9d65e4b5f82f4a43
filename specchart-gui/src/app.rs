//! Main application state and logic.
//!
//! Contains the `SpecchartApp` struct which owns the chart, forwards input
//! to it and collects the notifications it emits.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;

use eframe::egui;
use specchart_core::HostEvent;
use specchart_engine::{Scene, SpectrumChart};

use crate::demo::demo_scene;
use crate::input::InputTranslator;
use crate::loader::load_scene_worker;
use crate::message::AppMessage;

/// Entries kept in the event log.
const EVENT_LOG_CAPACITY: usize = 200;

/// One notification as shown in the event log.
pub struct LoggedEvent {
    pub time_s: f64,
    pub name: &'static str,
    pub detail: String,
}

impl LoggedEvent {
    fn new(time_s: f64, event: &HostEvent) -> Self {
        let detail = event
            .args()
            .iter()
            .map(|a| format!("{a:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            time_s,
            name: event.name(),
            detail,
        }
    }
}

/// Main application state.
pub struct SpecchartApp {
    /// Scene file currently shown; `None` for the demo.
    pub(crate) scene_path: Option<PathBuf>,
    pub(crate) chart: SpectrumChart,
    pub(crate) input: InputTranslator,
    /// Screen rectangle of the legend's close button, as last painted.
    pub(crate) legend_close: Option<egui::Rect>,

    pub(crate) is_loading: bool,
    pub(crate) status_text: String,
    pub(crate) events: VecDeque<LoggedEvent>,

    pub(crate) rx: Receiver<AppMessage>,
    pub(crate) tx: Sender<AppMessage>,
}

impl Default for SpecchartApp {
    fn default() -> Self {
        let (tx, rx) = channel();
        let mut app = Self {
            scene_path: None,
            chart: SpectrumChart::new(800.0, 450.0, specchart_core::ChartOptions::default()),
            input: InputTranslator::default(),
            legend_close: None,
            is_loading: false,
            status_text: String::new(),
            events: VecDeque::new(),
            rx,
            tx,
        };
        app.show_scene(&demo_scene(), None);
        app.status_text.push_str("Demo spectrum");
        app
    }
}

impl SpecchartApp {
    /// Load a scene file asynchronously.
    pub fn load_file(&mut self, path: PathBuf) {
        self.is_loading = true;
        self.status_text.clear();
        self.status_text.push_str("Loading scene...");
        let tx = self.tx.clone();
        thread::spawn(move || load_scene_worker(path.as_path(), &tx));
    }

    /// Replaces the chart with one built from `scene`, keeping its size.
    fn show_scene(&mut self, scene: &Scene, path: Option<&Path>) {
        let layout = self.chart.layout();
        let (width, height) = (layout.width, layout.height);
        self.chart = scene.build((Some(width), Some(height)));
        self.input = InputTranslator::default();
        self.legend_close = None;
        self.scene_path = path.map(Path::to_path_buf);
    }

    /// Handle pending messages from async workers.
    pub fn handle_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                AppMessage::LoadComplete(path, scene, dur) => {
                    self.is_loading = false;
                    self.show_scene(&scene, Some(&path));
                    self.status_text = format!(
                        "Loaded {} spectra in {:.1}ms",
                        scene.spectra.len(),
                        dur.as_secs_f64() * 1000.0
                    );
                }
                AppMessage::LoadError(e) => {
                    self.is_loading = false;
                    self.status_text = format!("Error: {e}");
                }
            }
        }
    }

    /// Moves notifications from the chart into the event log.
    pub fn collect_events(&mut self, time_s: f64) {
        for event in self.chart.take_events() {
            log::debug!("{} {:?}", event.name(), event.args());
            if self.events.len() == EVENT_LOG_CAPACITY {
                self.events.pop_front();
            }
            self.events.push_back(LoggedEvent::new(time_s, &event));
        }
    }
}

impl eframe::App for SpecchartApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        crate::ui::theme::apply_system_theme(ctx);
        self.handle_messages();
        self.render_side_panel(ctx);
        self.render_event_log(ctx);
        self.render_central_panel(ctx);
        self.collect_events(ctx.input(|i| i.time));

        if self.is_loading || self.chart.is_animating() || self.chart.active_mode().is_some() {
            ctx.request_repaint();
        } else if self.input.is_active() {
            // long-press and click timers need ticks while a finger rests
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }
}
