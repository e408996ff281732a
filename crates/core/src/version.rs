//! Version ordering for versioned cache regions.
//!
//! Versions are opaque to the cache; the integration layer supplies a total
//! order over them and the cache uses it to arbitrate which of two
//! concurrent writes is newer. A region constructed without a comparator is
//! unversioned and invalidates unconditionally.

use std::cmp::Ordering;
use std::sync::Arc;

/// Externally supplied total order over version markers.
pub type VersionComparator<Ver> = Arc<dyn Fn(&Ver, &Ver) -> Ordering + Send + Sync>;

/// Comparator that uses the version type's own `Ord` implementation.
pub fn natural_order<Ver>() -> VersionComparator<Ver>
where
    Ver: Ord + Send + Sync + 'static,
{
    Arc::new(|a, b| a.cmp(b))
}
