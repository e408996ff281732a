//! Soft-lock tokens for optimistic write fencing.
//!
//! A soft lock is an advisory write-intent marker stored inside a cache
//! entry, not an OS-level lock. Readers ignore it entirely; writers use it
//! to fence their read-modify-write cycles against each other. The two
//! outcomes of a lock attempt are modelled as an enum, with every granted
//! lock carrying an opaque per-acquisition identifier so that `unlock` can
//! tell its own grant apart from one a later writer installed.

use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for one successful lock acquisition.
///
/// Tokens compare by identity of the acquisition, never by the key they
/// were acquired for: two grants are never equal, even on the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockToken(u64);

impl LockToken {
    fn next() -> Self {
        LockToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

/// Outcome of a `try_lock` call on a cache region.
///
/// `Granted` must be presented back to `update` and `unlock`; `Denied`
/// means the writer never held the lock and any `update` with it fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftLock {
    /// The lock was acquired; the token identifies this acquisition.
    Granted(LockToken),
    /// Another writer won the race or the supplied version was stale.
    Denied,
}

impl SoftLock {
    /// Mint a freshly granted lock with a new acquisition token.
    #[must_use]
    pub fn acquire() -> Self {
        SoftLock::Granted(LockToken::next())
    }

    /// Whether this lock represents a successful acquisition.
    pub fn is_granted(&self) -> bool {
        matches!(self, SoftLock::Granted(_))
    }

    /// The acquisition token, if granted.
    pub fn token(&self) -> Option<LockToken> {
        match self {
            SoftLock::Granted(token) => Some(*token),
            SoftLock::Denied => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grants_are_distinct() {
        let a = SoftLock::acquire();
        let b = SoftLock::acquire();
        assert!(a.is_granted());
        assert!(b.is_granted());
        assert_ne!(a, b);
    }

    #[test]
    fn denied_carries_no_token() {
        assert_eq!(SoftLock::Denied.token(), None);
        assert!(!SoftLock::Denied.is_granted());
    }
}
