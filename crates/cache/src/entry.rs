//! Immutable cache entries.
//!
//! An entry is never mutated after construction; every change to a key is a
//! wholesale replacement of the stored entry with a new instance, applied
//! through a map-level compare-and-swap. That discipline is what makes the
//! unlock/evict/invalidate races safe without any per-entry locking.

use lagoon_core::SoftLock;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One versioned cache slot.
#[derive(Debug)]
pub(crate) struct CacheEntry<V, Ver> {
    /// Cached payload; absent for a lock-only placeholder.
    value: Option<Arc<V>>,
    /// Version marker; absent in unversioned regions.
    version: Option<Ver>,
    /// Outstanding soft lock, if a writer is mid-flight on this key.
    lock: Option<SoftLock>,
    /// Construction time, used for eviction ordering and TTL only.
    /// Lock transitions copy this unchanged.
    created_at: Instant,
}

impl<V, Ver: Clone> CacheEntry<V, Ver> {
    pub(crate) fn new(value: Option<Arc<V>>, version: Option<Ver>, lock: Option<SoftLock>) -> Self {
        Self {
            value,
            version,
            lock,
            created_at: Instant::now(),
        }
    }

    /// Value-less entry holding a freshly granted lock on an absent key.
    pub(crate) fn placeholder(version: Option<Ver>, lock: SoftLock) -> Self {
        Self::new(None, version, Some(lock))
    }

    /// Copy of this entry carrying `lock`, with creation time preserved.
    pub(crate) fn with_lock(&self, lock: SoftLock) -> Self {
        Self {
            value: self.value.clone(),
            version: self.version.clone(),
            lock: Some(lock),
            created_at: self.created_at,
        }
    }

    /// Copy of this entry with the lock cleared, creation time preserved.
    pub(crate) fn without_lock(&self) -> Self {
        Self {
            value: self.value.clone(),
            version: self.version.clone(),
            lock: None,
            created_at: self.created_at,
        }
    }

    pub(crate) fn value(&self) -> Option<&Arc<V>> {
        self.value.as_ref()
    }

    pub(crate) fn version(&self) -> Option<&Ver> {
        self.version.as_ref()
    }

    pub(crate) fn lock(&self) -> Option<SoftLock> {
        self.lock
    }

    pub(crate) fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Whether the entry carries an outstanding granted lock. Such entries
    /// are invisible to the eviction pass.
    pub(crate) fn is_write_locked(&self) -> bool {
        matches!(self.lock, Some(SoftLock::Granted(_)))
    }
}

/// Point-in-time public view of one entry, as returned by
/// [`RegionCache::snapshot`](crate::RegionCache::snapshot).
#[derive(Debug, Clone)]
pub struct EntrySnapshot<V, Ver> {
    /// Cached payload, absent for lock placeholders.
    pub value: Option<Arc<V>>,
    /// Version marker, absent in unversioned regions.
    pub version: Option<Ver>,
    /// Whether a writer currently holds the soft lock.
    pub locked: bool,
    /// Time elapsed since the entry was constructed.
    pub age: Duration,
}

impl<V, Ver: Clone> EntrySnapshot<V, Ver> {
    pub(crate) fn from_entry(entry: &CacheEntry<V, Ver>) -> Self {
        Self {
            value: entry.value.clone(),
            version: entry.version.clone(),
            locked: entry.is_write_locked(),
            age: entry.created_at.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_transitions_preserve_creation_time() {
        let entry: CacheEntry<String, i64> =
            CacheEntry::new(Some(Arc::new("v".to_string())), Some(1), None);
        let created = entry.created_at();

        let locked = entry.with_lock(SoftLock::acquire());
        assert!(locked.is_write_locked());
        assert_eq!(locked.created_at(), created);

        let unlocked = locked.without_lock();
        assert!(!unlocked.is_write_locked());
        assert_eq!(unlocked.created_at(), created);
        assert_eq!(unlocked.version(), Some(&1));
    }

    #[test]
    fn placeholder_has_no_value() {
        let entry: CacheEntry<String, i64> = CacheEntry::placeholder(Some(2), SoftLock::acquire());
        assert!(entry.value().is_none());
        assert!(entry.is_write_locked());
        assert_eq!(entry.version(), Some(&2));
    }
}
