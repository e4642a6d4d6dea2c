mod app;
mod bridge;
mod cache;
mod classifier;
mod config;
mod domain;
mod infrastructure;
mod monitor;
mod status;
mod ui;

use anyhow::Result;
use infrastructure::{directories, logging, shutdown};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let shutdown = shutdown::Shutdown::new();
    shutdown::install_signal_handlers(shutdown.clone());

    let app = app::PhishWatchApp::initialize(config, paths, shutdown)?;
    let outcome = app.run().await;
    if let Err(err) = &outcome {
        tracing::error!(target: "app", error = %err, "phishing monitor failed");
    }
    // A pending blocking stdin read would otherwise keep the runtime alive.
    std::process::exit(i32::from(outcome.is_err()));
}
