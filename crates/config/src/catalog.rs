//! Region catalog: name-keyed configuration lookup with default fallback

use crate::region::RegionConfig;
use lagoon_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Serialized form of one region's configuration.
///
/// Fields are optional so a catalog file may override only one bound;
/// untouched fields inherit the catalog default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegionConfigFile {
    max_entries: Option<usize>,
    time_to_live_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    regions: HashMap<String, RegionConfigFile>,
    #[serde(default)]
    defaults: Option<RegionConfigFile>,
}

/// Read-only mapping from region name to configuration.
///
/// Resolution never fails: a region without an explicit entry gets the
/// catalog-wide default.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: HashMap<String, RegionConfig>,
    default: RegionConfig,
}

impl RegionCatalog {
    /// Create an empty catalog resolving everything to `RegionConfig::default()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog with an explicit fallback configuration.
    pub fn with_default(default: RegionConfig) -> Self {
        Self {
            regions: HashMap::new(),
            default,
        }
    }

    /// Register an explicit configuration for a region.
    pub fn insert(&mut self, name: impl Into<String>, config: RegionConfig) {
        self.regions.insert(name.into(), config);
    }

    /// Resolve the configuration for a region, falling back to the default.
    pub fn resolve(&self, name: &str) -> RegionConfig {
        self.regions.get(name).cloned().unwrap_or_else(|| self.default.clone())
    }

    /// Number of explicitly configured regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the catalog has no explicit region entries.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Parse a catalog from its JSON representation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| Error::json("failed to parse region catalog", e))?;

        let default = merge(&RegionConfig::default(), file.defaults.as_ref());
        let regions = file
            .regions
            .iter()
            .map(|(name, overrides)| (name.clone(), merge(&default, Some(overrides))))
            .collect();

        Ok(Self { regions, default })
    }

    /// Load a catalog from a JSON file on disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read region catalog", e))?;
        Self::from_json_str(&contents)
    }
}

fn merge(base: &RegionConfig, overrides: Option<&RegionConfigFile>) -> RegionConfig {
    let Some(overrides) = overrides else {
        return base.clone();
    };
    RegionConfig {
        max_entries: overrides.max_entries.unwrap_or(base.max_entries),
        time_to_live: overrides
            .time_to_live_ms
            .map(Duration::from_millis)
            .unwrap_or(base.time_to_live),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolve_falls_back_to_default() {
        let mut catalog = RegionCatalog::with_default(RegionConfig {
            max_entries: 500,
            time_to_live: Duration::from_secs(60),
        });
        catalog.insert(
            "entities.person",
            RegionConfig {
                max_entries: 10,
                time_to_live: Duration::ZERO,
            },
        );

        assert_eq!(catalog.resolve("entities.person").max_entries, 10);
        assert_eq!(catalog.resolve("entities.unknown").max_entries, 500);
    }

    #[test]
    fn parses_catalog_json() {
        let catalog = RegionCatalog::from_json_str(
            r#"{
                "defaults": { "time_to_live_ms": 120000 },
                "regions": {
                    "entities.person": { "max_entries": 5000 },
                    "entities.order": { "max_entries": 0, "time_to_live_ms": 0 }
                }
            }"#,
        )
        .unwrap();

        let person = catalog.resolve("entities.person");
        assert_eq!(person.max_entries, 5000);
        assert_eq!(person.time_to_live, Duration::from_secs(120));

        let order = catalog.resolve("entities.order");
        assert!(!order.size_eviction_enabled());
        assert!(!order.ttl_eviction_enabled());

        // Unknown regions inherit the catalog defaults.
        let other = catalog.resolve("entities.other");
        assert_eq!(other.max_entries, 100_000);
        assert_eq!(other.time_to_live, Duration::from_secs(120));
    }

    #[test]
    fn invalid_json_surfaces_as_json_error() {
        let err = RegionCatalog::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn loads_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "regions": {{ "entities.person": {{ "max_entries": 42 }} }} }}"#
        )
        .unwrap();

        let catalog = RegionCatalog::from_file(file.path()).unwrap();
        assert_eq!(catalog.resolve("entities.person").max_entries, 42);
    }

    #[test]
    fn missing_file_surfaces_as_file_system_error() {
        let err = RegionCatalog::from_file(Path::new("/nonexistent/catalog.json")).unwrap_err();
        assert!(matches!(err, Error::FileSystem { .. }));
    }
}
