mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use anyhow::Context;
use app::CarSalesApp;
use data::source::{DataSource, DatasetHandle};
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // The dataset is fetched once, before the window opens. Without it there
    // is nothing to show, so a failed download ends the session.
    let handle = DatasetHandle::open(DataSource::Remote(config::DATASET_URL.to_string()))
        .context("loading the sales dataset")?;
    let state = AppState::new(handle);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Car Sales App",
        options,
        Box::new(|_cc| Ok(Box::new(CarSalesApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard window: {e}"))
}
