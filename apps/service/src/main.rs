#![warn(clippy::all, clippy::pedantic)]

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::{signal, sync::Notify};
use tracing::{error, info};
use upscout::{Config, DEFAULT_CONFIG_PATH, EndpointSelector, ProbeExecutor, SelectionScheduler};

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_tracing();

    // nothing is scheduled or probed before the config is known to be good
    let config = Config::from_path(DEFAULT_CONFIG_PATH)
        .with_context(|| format!("Failed to load {DEFAULT_CONFIG_PATH}"))?;
    info!("{}", config);

    let executor = Arc::new(ProbeExecutor::from_settings(&config.probe));
    let selector = EndpointSelector::new(executor);
    let mut scheduler = SelectionScheduler::new(selector, config.endpoints, config.period);

    let shutdown = Arc::new(Notify::new());
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                return;
            }
            shutdown.notify_one();
        }
    });

    scheduler.run_until(shutdown).await;

    Ok(())
}
