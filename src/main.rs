mod app;
mod device;
mod layout;
mod util;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::layout::LayoutConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Device inventory JSON: an array of devices or `{ "devices": [...] }`.
    #[arg(long, default_value = "devices.sample.json")]
    devices: PathBuf,

    /// Optional JSON file overriding layout tuning.
    #[arg(long)]
    layout_config: Option<PathBuf>,

    #[arg(long, default_value_t = 1440.0)]
    width: f32,

    #[arg(long, default_value_t = 920.0)]
    height: f32,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lanmap=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let layout_config = match &args.layout_config {
        Some(path) => LayoutConfig::load(path)?,
        None => LayoutConfig::default(),
    };

    info!(devices = %args.devices.display(), "starting lanmap");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([args.width, args.height]),
        ..Default::default()
    };

    let devices_path = args.devices;
    eframe::run_native(
        "lanmap",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::DashboardApp::new(
                cc,
                devices_path.clone(),
                layout_config,
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to run the dashboard window: {error}"))
}
