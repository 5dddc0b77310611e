mod app;
mod buddy;
mod config;
mod cycle;
mod deleter;
mod error;
mod scanner;
mod scheduler;
mod settings_form;
mod tray;
mod utils;

use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Desktop Buddy")
            .with_inner_size([300.0, 400.0])
            .with_position([100.0, 100.0])
            .with_decorations(false)
            .with_transparent(true)
            .with_window_level(egui::WindowLevel::AlwaysOnTop),
        ..Default::default()
    };

    eframe::run_native(
        "Desktop Buddy",
        options,
        Box::new(|cc| Ok(Box::new(app::BuddyApp::new(cc)))),
    )
}
