//! Stats Reporter Task
//!
//! Background task that periodically logs the counters of registered caches.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheRegistry;

/// Spawns a background task that logs every registered cache's stats.
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between reports. It only reads counters and never purges entries.
///
/// # Arguments
/// * `registry` - Shared registry of caches to report on
/// * `interval_secs` - Interval in seconds between reports
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_stats_reporter(registry: CacheRegistry, interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting stats reporter with interval of {} seconds",
            interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let caches = registry.snapshot().await;
            if caches.is_empty() {
                debug!("stats reporter: no caches registered");
                continue;
            }

            for cache in caches {
                let stats = cache.stats();
                info!(
                    "cache {} [{}]: hits={} misses={} evictions={} expirations={} entries={} hit_rate={:.2}",
                    cache.name(),
                    cache.strategy(),
                    stats.hits,
                    stats.misses,
                    stats.evictions,
                    stats.expirations,
                    stats.total_entries,
                    stats.hit_rate()
                );
            }
        }
    })
}
