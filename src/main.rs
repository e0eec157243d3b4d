#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod ui;

use msp_timeline::config::ViewerSettings;

fn main() -> eframe::Result<()> {
    let settings_path = ViewerSettings::default_path();
    let settings = ViewerSettings::load(&settings_path);

    // Keep the handle alive for the whole run.
    let _logger = match msp_timeline::logging::init(&settings.log_level) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("logging disabled: {e}");
            None
        }
    };
    log::info!("starting msp-timeline {}", env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([900.0, 480.0])
            .with_title("MSP Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "MSP Timeline",
        options,
        Box::new(|cc| Ok(Box::new(app::ViewerApp::new(cc, settings, settings_path)))),
    )
}
