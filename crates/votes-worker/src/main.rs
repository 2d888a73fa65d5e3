//! Votes Worker entry point
//!
//! Run with:
//! ```bash
//! cargo run -p votes-worker
//! ```
//!
//! Configuration is loaded from environment variables.

use tracing::{error, info};
use votes_common::{try_init_tracing, AppConfig};

#[tokio::main]
async fn main() {
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Worker failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Votes Worker...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        consumer_group = %config.messaging.consumer_group,
        purge_interval_secs = config.worker.purge_interval_secs,
        "Configuration loaded"
    );

    votes_worker::run(config).await?;

    Ok(())
}
