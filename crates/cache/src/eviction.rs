//! Size and TTL eviction pass.
//!
//! `cleanup` is driven by an external cadence (a scheduler, or the optional
//! background task in [`crate::cleanup`]) rather than by every insertion.
//! The pass works on a scan snapshot and removes entries with
//! compare-and-remove, so it can only ever discard what it actually saw;
//! anything concurrently replaced is skipped and picked up next time.

use crate::region::RegionCache;
use std::hash::Hash;
use std::sync::atomic::Ordering;
use std::time::Instant;
use tracing::debug;

impl<K, V, Ver> RegionCache<K, V, Ver>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    Ver: Clone + Send + Sync + 'static,
{
    /// One maintenance pass: drop expired entries, then trim the region back
    /// under its size bound.
    ///
    /// Entries holding a granted soft lock are never touched; an in-flight
    /// write must not have its slot dropped out from under it. Size eviction
    /// over-evicts by a 20% margin so the pass runs in batches instead of
    /// firing on every insertion once at capacity. Losing individual
    /// compare-and-remove races is fine; the next pass corrects it.
    pub fn cleanup(&self) {
        let config = &self.inner.config;
        let size_enabled = config.size_eviction_enabled();
        let ttl_enabled = config.ttl_eviction_enabled();
        if !size_enabled && !ttl_enabled {
            return;
        }

        let now = Instant::now();
        let scan: Vec<_> = self
            .inner
            .store
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();

        let mut expired = 0usize;
        let mut candidates = Vec::new();
        for (key, entry) in scan {
            if entry.is_write_locked() {
                continue;
            }
            if ttl_enabled && now.duration_since(entry.created_at()) > config.time_to_live {
                if self.inner.compare_remove(&key, &entry) {
                    expired += 1;
                    self.inner.stats.evictions.fetch_add(1, Ordering::Relaxed);
                }
            } else if size_enabled {
                candidates.push((key, entry));
            }
        }

        if expired > 0 {
            debug!(region = %self.inner.name, expired, "expired entries removed");
        }
        if !size_enabled {
            return;
        }

        let max_entries = config.max_entries;
        let size = self.inner.store.len();
        if size < max_entries {
            return;
        }
        // Evict the overflow plus a 20% batch margin, oldest first.
        let quota = (size - max_entries) + max_entries / 5;
        if quota == 0 {
            return;
        }

        candidates.sort_by_key(|(_, entry)| entry.created_at());

        let mut evicted = 0usize;
        for (key, entry) in &candidates {
            if self.inner.compare_remove(key, entry) {
                evicted += 1;
                self.inner.stats.evictions.fetch_add(1, Ordering::Relaxed);
                if evicted == quota {
                    break;
                }
            }
        }
        debug!(region = %self.inner.name, evicted, quota, "size eviction pass complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lagoon_config::{RegionConfig, RegionConfigBuilder};
    use lagoon_core::natural_order;
    use std::time::Duration;

    fn cache_with(config: RegionConfig) -> RegionCache<String, String, i64> {
        RegionCache::builder("entities.person")
            .config(config)
            .version_comparator(natural_order())
            .build()
    }

    #[test]
    fn cleanup_is_a_no_op_when_both_policies_disabled() {
        let cache = cache_with(RegionConfig::unbounded());
        for i in 0..10 {
            cache.put(format!("p{i}"), "v".into(), Some(1));
        }
        cache.cleanup();
        assert_eq!(cache.len(), 10);
    }

    #[test]
    fn expired_entries_are_removed_regardless_of_size_bound() {
        let cache = cache_with(
            RegionConfigBuilder::new()
                .with_max_entries(0)
                .with_time_to_live(Duration::from_millis(20))
                .build(),
        );
        cache.put("old".into(), "v".into(), Some(1));
        std::thread::sleep(Duration::from_millis(40));
        cache.put("fresh".into(), "v".into(), Some(1));

        cache.cleanup();

        assert!(!cache.contains(&"old".into()));
        assert!(cache.contains(&"fresh".into()));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn locked_entries_survive_cleanup() {
        let cache = cache_with(
            RegionConfigBuilder::new()
                .with_max_entries(1)
                .with_time_to_live(Duration::from_millis(10))
                .build(),
        );
        cache.put("locked".into(), "v".into(), Some(1));
        let lock = cache.try_lock("locked".into(), Some(1));
        assert!(lock.is_granted());

        std::thread::sleep(Duration::from_millis(30));
        // Oldest entry, expired, and the region is over its bound; the lock
        // still shields it.
        for i in 0..5 {
            cache.put(format!("p{i}"), "v".into(), Some(1));
        }
        cache.cleanup();

        assert!(cache.contains(&"locked".into()));
    }

    #[test]
    fn size_eviction_removes_overflow_plus_margin_oldest_first() {
        let cache = cache_with(
            RegionConfigBuilder::new()
                .with_max_entries(100)
                .with_time_to_live(Duration::ZERO)
                .build(),
        );
        for i in 0..130 {
            cache.put(format!("p{i:03}"), "v".into(), Some(1));
            // Distinct creation instants keep the eviction order exact.
            std::thread::sleep(Duration::from_micros(50));
        }

        cache.cleanup();

        // overflow 30 plus the 20% margin of 20.
        assert_eq!(cache.len(), 80);
        assert_eq!(cache.stats().evictions, 50);
        assert!(!cache.contains(&"p000".to_string()));
        assert!(!cache.contains(&"p049".to_string()));
        assert!(cache.contains(&"p050".to_string()));
        assert!(cache.contains(&"p129".to_string()));
    }

    #[test]
    fn at_capacity_triggers_a_margin_batch() {
        let cache = cache_with(
            RegionConfigBuilder::new()
                .with_max_entries(10)
                .with_time_to_live(Duration::ZERO)
                .build(),
        );
        for i in 0..10 {
            cache.put(format!("p{i}"), "v".into(), Some(1));
        }

        cache.cleanup();

        // overflow 0 still evicts the 20% margin batch.
        assert_eq!(cache.len(), 8);
    }

    #[test]
    fn under_capacity_evicts_nothing() {
        let cache = cache_with(
            RegionConfigBuilder::new()
                .with_max_entries(100)
                .with_time_to_live(Duration::ZERO)
                .build(),
        );
        for i in 0..50 {
            cache.put(format!("p{i}"), "v".into(), Some(1));
        }
        cache.cleanup();
        assert_eq!(cache.len(), 50);
    }
}
