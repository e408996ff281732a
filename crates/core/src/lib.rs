//! Core types and errors for lagoon.
//!
//! This crate holds the building blocks shared by the rest of the workspace:
//!
//! - **`errors`**: the primary `Error` enum and `Result` type alias,
//!   centralizing the failure modes of fallible operations (contention in
//!   the cache itself is reported as ordinary values, never as errors).
//! - **`lock`**: soft-lock tokens used by the optimistic write-fencing
//!   protocol.
//! - **`topic`**: the publish/subscribe seam the cache uses to distribute
//!   invalidations, plus an in-process reference implementation.
//! - **`version`**: the externally supplied version ordering used to
//!   arbitrate concurrent writes.

pub mod errors;
pub mod lock;
pub mod topic;
pub mod version;

pub use self::{
    errors::{Error, Result},
    lock::{LockToken, SoftLock},
    topic::{Invalidation, LocalTopic, MessageListener, Topic, TopicRegistry},
    version::{natural_order, VersionComparator},
};
