//! Store Health Task
//!
//! Pings the store at a fixed interval and reconnects after an outage.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

/// Spawns a background task that checks store health every `interval_secs`.
///
/// A failed ping (or a store that never connected) triggers a reconnect
/// attempt; the first healthy check after that is logged as a recovery.
pub fn spawn_health_task(store: Arc<CacheStore>, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting store health task with interval of {} seconds",
            interval.as_secs()
        );

        let mut healthy = true;
        loop {
            tokio::time::sleep(interval).await;
            healthy = check_once(&store, healthy).await;
        }
    })
}

/// Runs one health check, reconnecting if needed. Returns the new health.
async fn check_once(store: &CacheStore, was_healthy: bool) -> bool {
    if store.health_check().await {
        if !was_healthy {
            info!("Store connection recovered");
        } else {
            debug!("Store health check passed");
        }
        return true;
    }

    warn!("Store unhealthy, attempting reconnection");
    match store.connect().await {
        Ok(()) => {
            info!("Store connection recovered");
            true
        }
        Err(err) => {
            warn!("Store reconnection failed: {}", err);
            false
        }
    }
}
