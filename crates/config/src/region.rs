//! Region configuration model

use std::time::Duration;

/// Default entry cap applied when a region has no explicit configuration.
pub const DEFAULT_MAX_ENTRIES: usize = 100_000;

/// Default time-to-live applied when a region has no explicit configuration.
pub const DEFAULT_TIME_TO_LIVE: Duration = Duration::from_secs(3600);

/// Size and time bounds for one cache region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionConfig {
    /// Maximum number of entries before size eviction kicks in.
    /// `0` (or `usize::MAX`) disables size eviction.
    pub max_entries: usize,
    /// Time-to-live for entries. `Duration::ZERO` disables TTL eviction.
    pub time_to_live: Duration,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            time_to_live: DEFAULT_TIME_TO_LIVE,
        }
    }
}

impl RegionConfig {
    /// Configuration with both eviction policies disabled.
    #[must_use]
    pub fn unbounded() -> Self {
        Self {
            max_entries: 0,
            time_to_live: Duration::ZERO,
        }
    }

    /// Whether size eviction applies under this configuration.
    pub fn size_eviction_enabled(&self) -> bool {
        self.max_entries > 0 && self.max_entries != usize::MAX
    }

    /// Whether TTL eviction applies under this configuration.
    pub fn ttl_eviction_enabled(&self) -> bool {
        !self.time_to_live.is_zero()
    }
}

/// Builder for creating region configurations
pub struct RegionConfigBuilder {
    config: RegionConfig,
}

impl RegionConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: RegionConfig::default(),
        }
    }

    /// Set the maximum entry count (0 disables size eviction)
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = max_entries;
        self
    }

    /// Set the entry time-to-live (zero disables TTL eviction)
    pub fn with_time_to_live(mut self, time_to_live: Duration) -> Self {
        self.config.time_to_live = time_to_live;
        self
    }

    /// Build the configuration
    pub fn build(self) -> RegionConfig {
        self.config
    }
}

impl Default for RegionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
