//! File-backed [`KeyValueStore`].
//!
//! All keys live in one JSON document:
//!
//! ```json
//! { "schema_version": 1, "entries": { "workspaces": [], "activeWorkspaceId": "workspace-1" } }
//! ```
//!
//! Every operation re-reads the file so that state written by another
//! handle is never shadowed by a stale in-memory copy.

use crate::error::StoreError;
use crate::key_value::{KeyValueStore, StateKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Schema version written to, and required from, the state document.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    #[serde(default)]
    schema_version: u32,
    #[serde(default)]
    entries: BTreeMap<String, Value>,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// Persisted store kept in a single versioned JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Serializes read-modify-write of the document within this process.
    io_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            io_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    async fn read_document(&self) -> Result<StateDocument, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StateDocument::default());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        if contents.trim().is_empty() {
            return Ok(StateDocument::default());
        }

        let document: StateDocument =
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })?;

        if document.schema_version != SCHEMA_VERSION {
            return Err(StoreError::UnsupportedSchema {
                found: document.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(document)
    }

    async fn write_document(&self, document: &StateDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let contents =
            serde_json::to_string_pretty(document).map_err(|source| StoreError::Encode {
                key: "document",
                source,
            })?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, contents)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        log::debug!(
            "Wrote state document ({} keys) to {:?}",
            document.entries.len(),
            self.path
        );
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: StateKey) -> Result<Option<Value>, StoreError> {
        let _guard = self.io_lock.lock().await;
        let document = self.read_document().await?;
        Ok(document.entries.get(key.as_str()).cloned())
    }

    async fn set(&self, key: StateKey, value: Value) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.read_document().await?;
        document.entries.insert(key.as_str().to_string(), value);
        self.write_document(&document).await
    }

    async fn remove(&self, key: StateKey) -> Result<(), StoreError> {
        let _guard = self.io_lock.lock().await;
        let mut document = self.read_document().await?;
        if document.entries.remove(key.as_str()).is_none() {
            return Ok(());
        }
        self.write_document(&document).await
    }
}
