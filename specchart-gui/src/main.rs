//! Specchart GUI application entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod demo;
mod input;
mod loader;
mod message;
mod ui;

use app::SpecchartApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();
    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    let initial = std::env::args_os().nth(1).map(std::path::PathBuf::from);
    eframe::run_native(
        "Specchart",
        opts,
        Box::new(move |cc| {
            ui::theme::configure_style(&cc.egui_ctx);
            let mut app = SpecchartApp::default();
            if let Some(path) = initial {
                app.load_file(path);
            }
            Ok(Box::new(app))
        }),
    )
}
