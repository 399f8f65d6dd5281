mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::RentalExplorerApp;
use clap::Parser;
use config::Cli;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Cli::parse().into_config()?;
    log::info!("Using listings file {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rental Explorer – Listings Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(RentalExplorerApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("window error: {e}"))
}
