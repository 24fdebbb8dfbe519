//! Typed access to the persisted model.
//!
//! Every component reads and writes the model through a [`Repository`]
//! rather than the raw key-value store. Workspace-list mutations go through
//! [`Repository::modify_workspaces`], which holds a per-key writer lock for
//! the whole read-modify-write so that two handlers in this process cannot
//! clobber each other's change to the list.

use crate::error::StoreError;
use crate::key_value::{KeyValueStore, StateKey};
use crate::model::{GroupId, Workspace, WorkspaceId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

/// Typed repository over a [`KeyValueStore`].
#[derive(Debug)]
pub struct Repository<S> {
    store: S,
    workspaces_lock: Mutex<()>,
}

impl<S: KeyValueStore> Repository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            workspaces_lock: Mutex::new(()),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read<T: DeserializeOwned>(&self, key: StateKey) -> Result<Option<T>, StoreError> {
        match self.store.get(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| StoreError::Decode {
                    key: key.as_str(),
                    source,
                }),
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: StateKey, value: &T) -> Result<(), StoreError> {
        let value = serde_json::to_value(value).map_err(|source| StoreError::Encode {
            key: key.as_str(),
            source,
        })?;
        self.store.set(key, value).await
    }

    // ========================================================================
    // Workspaces
    // ========================================================================

    /// Load every workspace (empty when never written).
    pub async fn load_workspaces(&self) -> Result<Vec<Workspace>, StoreError> {
        Ok(self.read(StateKey::Workspaces).await?.unwrap_or_default())
    }

    /// Overwrite the workspace list.
    pub async fn save_workspaces(&self, workspaces: &[Workspace]) -> Result<(), StoreError> {
        let _guard = self.workspaces_lock.lock().await;
        self.write(StateKey::Workspaces, workspaces).await
    }

    /// Read-modify-write the workspace list under the writer lock.
    ///
    /// The list is loaded fresh inside the lock, `f` mutates it, and it is
    /// written back only if it actually changed.
    pub async fn modify_workspaces<R>(
        &self,
        f: impl FnOnce(&mut Vec<Workspace>) -> R,
    ) -> Result<R, StoreError> {
        let _guard = self.workspaces_lock.lock().await;
        let original = self.load_workspaces().await?;
        let mut workspaces = original.clone();
        let result = f(&mut workspaces);
        if workspaces != original {
            self.write(StateKey::Workspaces, &workspaces).await?;
        }
        Ok(result)
    }

    // ========================================================================
    // Active workspace pointer
    // ========================================================================

    pub async fn load_active(&self) -> Result<Option<WorkspaceId>, StoreError> {
        self.read(StateKey::ActiveWorkspaceId).await
    }

    pub async fn save_active(&self, id: &WorkspaceId) -> Result<(), StoreError> {
        self.write(StateKey::ActiveWorkspaceId, id).await
    }

    pub async fn clear_active(&self) -> Result<(), StoreError> {
        self.store.remove(StateKey::ActiveWorkspaceId).await
    }

    // ========================================================================
    // Hidden holder reference
    // ========================================================================

    /// Cached holder id. Callers must revalidate it before use.
    pub async fn load_holder(&self) -> Result<Option<GroupId>, StoreError> {
        self.read(StateKey::HiddenGroupId).await
    }

    pub async fn save_holder(&self, id: GroupId) -> Result<(), StoreError> {
        self.write(StateKey::HiddenGroupId, &id).await
    }

    pub async fn clear_holder(&self) -> Result<(), StoreError> {
        self.store.remove(StateKey::HiddenGroupId).await
    }
}
