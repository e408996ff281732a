//! Background cleanup task management
//!
//! The eviction pass itself is a plain synchronous call; scheduling it is
//! the caller's business. For deployments that want the cache to look after
//! itself, this module spawns a tokio interval task driving
//! [`RegionCache::cleanup`] on a fixed cadence.

use crate::region::RegionCache;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Start the background cleanup task.
///
/// A zero interval disables the task entirely (useful for tests). The task
/// holds a clone of the cache handle and runs until aborted by
/// [`stop_cleanup_task`]; restarting replaces any previous task.
pub fn start_cleanup_task<K, V, Ver>(cache: &RegionCache<K, V, Ver>, cleanup_interval: Duration)
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    Ver: Clone + Send + Sync + 'static,
{
    if cleanup_interval == Duration::ZERO {
        return;
    }

    let worker = cache.clone();
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(cleanup_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            worker.cleanup();
        }
    });

    if let Some(previous) = cache.inner.cleanup_handle.write().replace(handle) {
        previous.abort();
    }
}

/// Stop the background cleanup task, if one is running.
pub fn stop_cleanup_task<K, V, Ver>(cache: &RegionCache<K, V, Ver>) {
    if let Some(handle) = cache.inner.cleanup_handle.write().take() {
        handle.abort();
    }
}
