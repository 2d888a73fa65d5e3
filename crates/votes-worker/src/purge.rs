//! Periodic purge of expired romances

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use votes_service::{RomanceService, ServiceContext};

/// Purge expired romances every `interval` until `shutdown` flips.
///
/// The first pass runs immediately. A failed pass is logged and retried on
/// the next tick. Returns the number of rows removed.
pub async fn run_purge_loop(
    ctx: ServiceContext,
    interval: Duration,
    batch_size: u32,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut total = 0u64;

    info!(interval_secs = interval.as_secs(), batch_size, "Purge loop started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        match RomanceService::new(&ctx)
            .purge_expired(Utc::now(), batch_size)
            .await
        {
            Ok(purged) => total += purged,
            Err(e) => error!(error = %e, "Expired romance purge failed"),
        }
    }

    info!(total, "Purge loop stopped");
    total
}
