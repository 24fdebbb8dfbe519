//! The persisted key-value seam.

use crate::error::StoreError;
use serde_json::Value;
use std::future::Future;

/// The three logical keys of the persisted model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// List of every workspace.
    Workspaces,
    /// Id of the active workspace, absent when none is active.
    ActiveWorkspaceId,
    /// Cached id of the hidden holder group, absent until first hide.
    HiddenGroupId,
}

impl StateKey {
    /// Storage name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKey::Workspaces => "workspaces",
            StateKey::ActiveWorkspaceId => "activeWorkspaceId",
            StateKey::HiddenGroupId => "hiddenGroupId",
        }
    }
}

/// Durable asynchronous key-value storage.
///
/// Writes to different keys are not transactional with each other.
/// Implementations must be shareable across tasks.
pub trait KeyValueStore: Send + Sync {
    /// Read a key. `Ok(None)` when the key has never been written or was removed.
    fn get(&self, key: StateKey) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Replace the value stored under a key.
    fn set(&self, key: StateKey, value: Value)
    -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a key. Removing an absent key succeeds.
    fn remove(&self, key: StateKey) -> impl Future<Output = Result<(), StoreError>> + Send;
}
