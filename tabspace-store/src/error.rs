//! Typed error types for tabspace-store.

use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing the persisted model.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("State file I/O failed for '{path}': {source}")]
    Io {
        /// Path of the state file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The backing file is not a valid state document.
    #[error("State file '{path}' could not be parsed: {source}")]
    Parse {
        /// Path of the state file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The state document was written with a schema this build does not read.
    #[error("Unsupported state schema version {found} (expected {expected})")]
    UnsupportedSchema {
        /// Version tag found in the document (0 when absent).
        found: u32,
        /// Version this build reads and writes.
        expected: u32,
    },

    /// A stored value does not have the shape expected for its key.
    #[error("Stored value for '{key}' has an unexpected shape: {source}")]
    Decode {
        /// Key whose value failed to decode.
        key: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage.
    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        /// Key whose value failed to encode.
        key: &'static str,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// The store refused the operation (e.g. storage quota, injected fault).
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
