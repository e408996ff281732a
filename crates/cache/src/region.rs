//! Local region cache with soft-lock write fencing and topic invalidation.
//!
//! One `RegionCache` holds the process-local copy of a named region. All
//! mutation goes through map-level compare-and-swap against the entry
//! instance the caller observed; the store itself is a sharded concurrent
//! map and no operation blocks or suspends. Peers holding the same region
//! stay approximately consistent through `Invalidation` messages published
//! on every successful update or removal.

use crate::entry::{CacheEntry, EntrySnapshot};
use crate::stats::{CacheStats, StatsSnapshot};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lagoon_config::{RegionCatalog, RegionConfig};
use lagoon_core::{Invalidation, MessageListener, SoftLock, Topic, VersionComparator};
use std::cmp::Ordering;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Shared state behind a region cache handle.
pub(crate) struct RegionInner<K, V, Ver> {
    pub(crate) name: String,
    pub(crate) store: DashMap<K, Arc<CacheEntry<V, Ver>>>,
    pub(crate) comparator: Option<VersionComparator<Ver>>,
    pub(crate) config: RegionConfig,
    pub(crate) stats: CacheStats,
    pub(crate) cleanup_handle: parking_lot::RwLock<Option<JoinHandle<()>>>,
}

impl<K, V, Ver> RegionInner<K, V, Ver>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    Ver: Clone + Send + Sync + 'static,
{
    /// Insert `entry` only if `key` is absent. Returns whether it won.
    fn insert_if_absent(&self, key: K, entry: CacheEntry<V, Ver>) -> bool {
        match self.store.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(entry));
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Replace the entry for `key` with `next`, but only while the stored
    /// instance is still the one the caller observed.
    fn compare_replace(
        &self,
        key: &K,
        observed: &Arc<CacheEntry<V, Ver>>,
        next: CacheEntry<V, Ver>,
    ) -> bool {
        match self.store.entry(key.clone()) {
            Entry::Occupied(mut slot) => {
                if Arc::ptr_eq(slot.get(), observed) {
                    slot.insert(Arc::new(next));
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Remove `key` only while the stored instance is still `observed`.
    pub(crate) fn compare_remove(&self, key: &K, observed: &Arc<CacheEntry<V, Ver>>) -> bool {
        self.store
            .remove_if(key, |_, current| Arc::ptr_eq(current, observed))
            .is_some()
    }

    /// Clone of the current entry for `key`, taken without holding any
    /// shard guard afterwards.
    fn observe(&self, key: &K) -> Option<Arc<CacheEntry<V, Ver>>> {
        self.store.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Apply a received invalidation with version arbitration.
    ///
    /// Unversioned regions discard unconditionally. Versioned regions remove
    /// the observed entry only when the remote version is strictly newer,
    /// and only while the entry has not been replaced since it was read, so
    /// a stale or duplicated message can never discard a newer local value.
    fn apply_invalidation(&self, message: &Invalidation<K, Ver>) {
        let Some(comparator) = &self.comparator else {
            if self.store.remove(&message.key).is_some() {
                self.stats
                    .invalidations
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            }
            return;
        };

        let Some(observed) = self.observe(&message.key) else {
            return;
        };
        // A message or entry without a version cannot be arbitrated; keep
        // the local value rather than risk discarding a newer one.
        let newer = match (message.version.as_ref(), observed.version()) {
            (Some(remote), Some(current)) => comparator(remote, current) == Ordering::Greater,
            _ => false,
        };
        if newer && self.compare_remove(&message.key, &observed) {
            self.stats
                .invalidations
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            debug!(region = %self.name, "entry invalidated by remote update");
        }
    }
}

/// Listener registered on the region's topic at construction.
struct InvalidationListener<K, V, Ver> {
    inner: Arc<RegionInner<K, V, Ver>>,
}

impl<K, V, Ver> MessageListener<Invalidation<K, Ver>> for InvalidationListener<K, V, Ver>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    Ver: Clone + Send + Sync + 'static,
{
    fn on_message(&self, message: &Invalidation<K, Ver>) {
        self.inner.apply_invalidation(message);
    }

    fn name(&self) -> &'static str {
        "region-invalidation"
    }
}

/// Process-local copy of one named cache region.
///
/// Cloning the handle is cheap and shares the underlying store; a region is
/// typically created once and shared by every thread touching that dataset.
pub struct RegionCache<K, V, Ver> {
    pub(crate) inner: Arc<RegionInner<K, V, Ver>>,
    topic: Option<Arc<dyn Topic<Invalidation<K, Ver>>>>,
}

impl<K, V, Ver> Clone for RegionCache<K, V, Ver> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            topic: self.topic.clone(),
        }
    }
}

impl<K, V, Ver> RegionCache<K, V, Ver>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    Ver: Clone + Send + Sync + 'static,
{
    /// Start building a cache for the named region.
    pub fn builder(name: impl Into<String>) -> RegionCacheBuilder<K, V, Ver> {
        RegionCacheBuilder::new(name)
    }

    /// The region name, which is also the invalidation channel name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The configuration snapshot this region was built with.
    pub fn config(&self) -> &RegionConfig {
        &self.inner.config
    }

    /// Read the current value for a key.
    ///
    /// Never blocks and ignores lock state entirely: a value mid-replacement
    /// by a locked writer is still served (read-uncommitted with respect to
    /// in-flight writes). Lock placeholders read as absent.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let value = self
            .inner
            .store
            .get(key)
            .and_then(|entry| entry.value().value().cloned());
        match value {
            Some(value) => {
                self.inner
                    .stats
                    .hits
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.inner
                    .stats
                    .misses
                    .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a value unconditionally, without notifying peers.
    ///
    /// This is the cache-miss population path: a fresh load from the backing
    /// store is not an update from any peer's perspective, so it neither
    /// contends with the lock protocol nor publishes an invalidation.
    pub fn put(&self, key: K, value: V, version: Option<Ver>) -> bool {
        let entry = CacheEntry::new(Some(Arc::new(value)), version, None);
        self.inner.store.insert(key, Arc::new(entry));
        self.inner
            .stats
            .writes
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        true
    }

    /// Attempt to soft-lock a key ahead of a read-modify-write cycle.
    ///
    /// An absent key is claimed with a value-less placeholder. A present key
    /// is lockable when no version was supplied or the supplied version is
    /// not older than the stored one; the lock is installed by
    /// compare-and-swap against the observed entry, so losing any race
    /// yields `Denied`. Stale writers are denied outright.
    pub fn try_lock(&self, key: K, version: Option<Ver>) -> SoftLock {
        match self.inner.observe(&key) {
            None => {
                let lock = SoftLock::acquire();
                if self
                    .inner
                    .insert_if_absent(key, CacheEntry::placeholder(version, lock))
                {
                    lock
                } else {
                    SoftLock::Denied
                }
            }
            Some(observed) => {
                if !self.lockable(version.as_ref(), observed.version()) {
                    return SoftLock::Denied;
                }
                let lock = SoftLock::acquire();
                if self
                    .inner
                    .compare_replace(&key, &observed, observed.with_lock(lock))
                {
                    lock
                } else {
                    SoftLock::Denied
                }
            }
        }
    }

    fn lockable(&self, requested: Option<&Ver>, current: Option<&Ver>) -> bool {
        match (requested, current, &self.inner.comparator) {
            (None, _, _) => true,
            (Some(_), None, _) | (Some(_), _, None) => true,
            (Some(requested), Some(current), Some(comparator)) => {
                comparator(requested, current) != Ordering::Less
            }
        }
    }

    /// Release a soft lock previously returned by [`try_lock`](Self::try_lock).
    ///
    /// Silently does nothing when the entry no longer carries this exact
    /// acquisition: the writer may be aborting after a race it lost, and
    /// that must not disturb whoever won.
    pub fn unlock(&self, key: &K, lock: &SoftLock) {
        let Some(observed) = self.inner.observe(key) else {
            return;
        };
        if observed.lock() == Some(*lock) {
            self.inner
                .compare_replace(key, &observed, observed.without_lock());
        }
    }

    /// Apply a locked write: publish an invalidation, then store the value.
    ///
    /// Fails without side effects when the caller never held the lock, or
    /// when a strictly newer version has landed since the lock was taken
    /// (the stale write must be discarded, not applied). On success the new
    /// entry inherits the caller's lock token: a successful update does not
    /// unlock the key, so pair it with an explicit `unlock`.
    ///
    /// `previous_version` is accepted for interface parity with read/write-
    /// through integration layers and is not consulted.
    pub fn update(
        &self,
        key: K,
        value: V,
        new_version: Option<Ver>,
        _previous_version: Option<Ver>,
        lock: &SoftLock,
    ) -> bool {
        if !lock.is_granted() {
            return false;
        }

        if let Some(observed) = self.inner.observe(&key) {
            let stale = match (
                new_version.as_ref(),
                observed.version(),
                &self.inner.comparator,
            ) {
                (Some(new), Some(current), Some(comparator)) => {
                    comparator(new, current) == Ordering::Less
                }
                _ => false,
            };
            if stale {
                debug!(region = %self.inner.name, "stale update rejected");
                return false;
            }
        }

        self.publish(Invalidation {
            key: key.clone(),
            version: new_version.clone(),
        });

        let entry = CacheEntry::new(Some(Arc::new(value)), new_version, Some(*lock));
        self.inner.store.insert(key, Arc::new(entry));
        self.inner
            .stats
            .writes
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        true
    }

    /// Remove a key, notifying peers when something was actually removed.
    pub fn remove(&self, key: &K) -> bool {
        match self.inner.store.remove(key) {
            Some((key, entry)) => {
                self.publish(Invalidation {
                    key,
                    version: entry.version().cloned(),
                });
                true
            }
            None => false,
        }
    }

    /// Whether the store currently holds an entry for `key` (including lock
    /// placeholders).
    pub fn contains(&self, key: &K) -> bool {
        self.inner.store.contains_key(key)
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.store.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.store.is_empty()
    }

    /// Drop every entry without notifying peers.
    pub fn clear(&self) {
        self.inner.store.clear();
    }

    /// Point-in-time view of all entries.
    pub fn snapshot(&self) -> Vec<(K, EntrySnapshot<V, Ver>)> {
        self.inner
            .store
            .iter()
            .map(|entry| (entry.key().clone(), EntrySnapshot::from_entry(entry.value())))
            .collect()
    }

    /// Snapshot of the operation counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }

    fn publish(&self, message: Invalidation<K, Ver>) {
        if let Some(topic) = &self.topic {
            topic.publish(message);
        }
    }
}

/// Builder for [`RegionCache`].
pub struct RegionCacheBuilder<K, V, Ver> {
    name: String,
    config: Option<RegionConfig>,
    comparator: Option<VersionComparator<Ver>>,
    topic: Option<Arc<dyn Topic<Invalidation<K, Ver>>>>,
    _values: PhantomData<fn() -> V>,
}

impl<K, V, Ver> RegionCacheBuilder<K, V, Ver>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
    Ver: Clone + Send + Sync + 'static,
{
    /// Create a builder for the named region.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: None,
            comparator: None,
            topic: None,
            _values: PhantomData,
        }
    }

    /// Use an explicit configuration snapshot.
    pub fn config(mut self, config: RegionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Resolve the configuration from a catalog by region name.
    pub fn from_catalog(mut self, catalog: &RegionCatalog) -> Self {
        self.config = Some(catalog.resolve(&self.name));
        self
    }

    /// Supply the version comparator; absent means unversioned semantics.
    pub fn version_comparator(mut self, comparator: VersionComparator<Ver>) -> Self {
        self.comparator = Some(comparator);
        self
    }

    /// Bind an explicit invalidation topic.
    pub fn topic(mut self, topic: Arc<dyn Topic<Invalidation<K, Ver>>>) -> Self {
        self.topic = Some(topic);
        self
    }

    /// Bind the topic named after the region from an in-process registry.
    pub fn registry(mut self, registry: &lagoon_core::TopicRegistry<Invalidation<K, Ver>>) -> Self {
        self.topic = Some(registry.topic(&self.name));
        self
    }

    /// Build the cache and subscribe its invalidation listener.
    pub fn build(self) -> RegionCache<K, V, Ver> {
        let inner = Arc::new(RegionInner {
            name: self.name,
            store: DashMap::new(),
            comparator: self.comparator,
            config: self.config.unwrap_or_default(),
            stats: CacheStats::default(),
            cleanup_handle: parking_lot::RwLock::new(None),
        });

        if let Some(topic) = &self.topic {
            topic.add_listener(Arc::new(InvalidationListener {
                inner: Arc::clone(&inner),
            }));
        }

        RegionCache {
            inner,
            topic: self.topic,
        }
    }
}
