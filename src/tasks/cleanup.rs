//! Expiry Cleanup Task
//!
//! Background task that periodically sweeps expired entries out of every
//! registered cache. Reads already ignore expired entries; the sweep only
//! returns their memory early.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::ExpirySweep;

/// Spawns a background task that calls `purge_expired` on each cache every
/// `interval`.
///
/// Returns the task handle; abort it during graceful shutdown.
///
/// # Example
/// ```ignore
/// let cleanup_handle = spawn_cleanup_task(state.caches.clone(), Duration::from_secs(30));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(caches: Vec<Arc<dyn ExpirySweep>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            caches = caches.len(),
            "Starting expiry cleanup task with interval of {:?}", interval
        );

        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;

            for cache in &caches {
                let removed = cache.purge_expired();
                if removed > 0 {
                    info!(cache = %cache.name(), removed, "Expiry cleanup removed entries");
                } else {
                    debug!(cache = %cache.name(), "Expiry cleanup: nothing expired");
                }
            }
        }
    })
}
