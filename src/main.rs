use anyhow::{Context, Result};
use eframe::egui;

use naplan_dashboard::app::DashboardApp;
use naplan_dashboard::config::Config;
use naplan_dashboard::DatasetStore;

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::from_env();
    let store = DatasetStore::load(&config.data_dir)
        .with_context(|| format!("loading datasets from {}", config.data_dir.display()))
        .inspect_err(|e| log::error!("{e:#}"))?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NAPLAN Analysis",
        options,
        Box::new(move |_cc| Ok(Box::new(DashboardApp::new(store)))),
    )
    .map_err(|e| anyhow::anyhow!("UI failed: {e}"))
}
