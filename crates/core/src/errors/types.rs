//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for lagoon operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for lagoon operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Region or catalog configuration errors
    Configuration { message: String },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}
