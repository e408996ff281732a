//! Local versioned cache region with distributed invalidation.
//!
//! A `RegionCache` is the process-local copy of one named cache region: a
//! second-level application cache kept approximately consistent with the
//! copies other processes hold, through eventual invalidation over a
//! publish/subscribe channel rather than consensus. Writers fence their
//! read-modify-write cycles with an optimistic soft-lock protocol; readers
//! never block; capacity and TTL bounds are enforced by a periodic
//! `cleanup` pass instead of on every mutation.
//!
//! ```
//! use lagoon_cache::RegionCache;
//! use lagoon_config::RegionConfig;
//! use lagoon_core::natural_order;
//!
//! let cache: RegionCache<String, String, i64> = RegionCache::builder("entities.person")
//!     .config(RegionConfig::default())
//!     .version_comparator(natural_order())
//!     .build();
//!
//! cache.put("p1".to_string(), "alice".to_string(), Some(1));
//! let lock = cache.try_lock("p1".to_string(), Some(1));
//! if lock.is_granted() {
//!     cache.update("p1".to_string(), "alice2".to_string(), Some(2), Some(1), &lock);
//!     cache.unlock(&"p1".to_string(), &lock);
//! }
//! assert_eq!(cache.get(&"p1".to_string()).unwrap().as_str(), "alice2");
//! ```

pub mod cleanup;
pub mod entry;
pub mod eviction;
pub mod region;
pub mod stats;

pub use cleanup::{start_cleanup_task, stop_cleanup_task};
pub use entry::EntrySnapshot;
pub use region::{RegionCache, RegionCacheBuilder};
pub use stats::StatsSnapshot;

// Re-export the pieces callers need to construct and drive a region.
pub use lagoon_config::{RegionCatalog, RegionConfig, RegionConfigBuilder};
pub use lagoon_core::{
    natural_order, Invalidation, LocalTopic, MessageListener, SoftLock, Topic, TopicRegistry,
    VersionComparator,
};
