//! Region configuration for lagoon.
//!
//! Each named cache region carries size and time bounds resolved once at
//! construction. Configuration is a read-only snapshot: missing entries fall
//! back to defaults and resolution never fails.

pub mod catalog;
pub mod region;

pub use catalog::RegionCatalog;
pub use region::{RegionConfig, RegionConfigBuilder, DEFAULT_MAX_ENTRIES, DEFAULT_TIME_TO_LIVE};
