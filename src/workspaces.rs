//! Workspace lifecycle: create, rename, delete, move tabs between workspaces.
//!
//! The free functions only touch the persisted model and are shared with the
//! CLI. [`WorkspaceManager`] adds notifications and queues browser-facing
//! work; [`Lifecycle`] performs that work on the dispatcher.

use crate::dispatcher::{CoreEvent, CoreHandle};
use crate::error::CoreError;
use crate::messaging::MessageBus;
use crate::oracle::TabOracle;
use crate::visibility::{VisibilityController, VisibilityOutcome};
use std::sync::Arc;
use tabspace_store::{KeyValueStore, Repository, TabId, Workspace, WorkspaceId};

/// Every workspace in display order.
pub async fn list_workspaces<S: KeyValueStore>(
    repo: &Repository<S>,
) -> Result<Vec<Workspace>, CoreError> {
    Ok(repo.load_workspaces().await?)
}

/// Append a new, empty workspace.
pub async fn create_workspace<S: KeyValueStore>(
    repo: &Repository<S>,
    name: &str,
) -> Result<Workspace, CoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoreError::EmptyName);
    }

    let created = repo
        .modify_workspaces(|workspaces| {
            let workspace = Workspace::new(WorkspaceId::generate(workspaces), name);
            workspaces.push(workspace.clone());
            workspace
        })
        .await?;
    log::info!("Created workspace {} ({})", created.id, created.name);
    Ok(created)
}

/// Rename a workspace. Returns `false` when nothing changed.
///
/// A blank name is ignored rather than rejected.
pub async fn rename_workspace<S: KeyValueStore>(
    repo: &Repository<S>,
    id: &WorkspaceId,
    name: &str,
) -> Result<bool, CoreError> {
    let name = name.trim();
    let renamed = repo
        .modify_workspaces(|workspaces| {
            let workspace = workspaces.iter_mut().find(|w| &w.id == id)?;
            if name.is_empty() || workspace.name == name {
                return Some(false);
            }
            workspace.name = name.to_string();
            Some(true)
        })
        .await?
        .ok_or_else(|| CoreError::UnknownWorkspace(id.clone()))?;

    if renamed {
        log::info!("Renamed workspace {} to {}", id, name);
    }
    Ok(renamed)
}

/// Delete and move, the lifecycle steps that touch tab visibility.
///
/// Owned by the dispatcher so these run serialized with activations and tab
/// events.
pub struct Lifecycle<S, O> {
    repo: Arc<Repository<S>>,
    oracle: Arc<O>,
    visibility: Arc<VisibilityController<S, O>>,
    bus: MessageBus,
}

impl<S: KeyValueStore, O: TabOracle> Lifecycle<S, O> {
    pub fn new(
        repo: Arc<Repository<S>>,
        oracle: Arc<O>,
        visibility: Arc<VisibilityController<S, O>>,
        bus: MessageBus,
    ) -> Self {
        Self {
            repo,
            oracle,
            visibility,
            bus,
        }
    }

    /// Delete a workspace, making its tabs visible first.
    ///
    /// Tabs that were closed behind the engine's back are skipped. The record
    /// is removed even when showing the tabs fails.
    pub async fn delete(&self, id: &WorkspaceId) -> Result<Workspace, CoreError> {
        let workspace = list_workspaces(&self.repo)
            .await?
            .into_iter()
            .find(|w| &w.id == id)
            .ok_or_else(|| CoreError::UnknownWorkspace(id.clone()))?;

        match self.oracle.tab_ids().await {
            Ok(existing) => {
                let live: Vec<TabId> = workspace
                    .tabs
                    .iter()
                    .copied()
                    .filter(|t| existing.contains(t))
                    .collect();
                if let VisibilityOutcome::Abandoned(reason) = self.visibility.show(&live).await {
                    log::warn!("Tabs of deleted workspace {} stay hidden: {}", id, reason);
                }
            }
            Err(e) => log::warn!("Could not list tabs while deleting {}: {}", id, e),
        }

        self.repo
            .modify_workspaces(|workspaces| workspaces.retain(|w| &w.id != id))
            .await?;
        if self.repo.load_active().await?.as_ref() == Some(id) {
            self.repo.clear_active().await?;
        }

        log::info!("Deleted workspace {} ({})", id, workspace.name);
        self.bus.refresh();
        Ok(workspace)
    }

    /// Move a tab into `to`, taking it away from any other workspace.
    ///
    /// The tab becomes visible when `to` is the active workspace and hidden
    /// otherwise.
    pub async fn move_tab(&self, tab_id: TabId, to: &WorkspaceId) -> Result<(), CoreError> {
        let moved = self
            .repo
            .modify_workspaces(|workspaces| {
                if !workspaces.iter().any(|w| &w.id == to) {
                    return false;
                }
                for workspace in workspaces.iter_mut() {
                    while workspace.remove_tab(tab_id) {}
                }
                if let Some(target) = workspaces.iter_mut().find(|w| &w.id == to) {
                    target.tabs.push(tab_id);
                }
                true
            })
            .await?;
        if !moved {
            return Err(CoreError::UnknownWorkspace(to.clone()));
        }

        let outcome = if self.repo.load_active().await?.as_ref() == Some(to) {
            self.visibility.show(&[tab_id]).await
        } else {
            self.visibility.hide(&[tab_id]).await
        };
        log::debug!("Moved tab {} to {} ({:?})", tab_id, to, outcome);

        self.bus.refresh();
        Ok(())
    }
}

/// UI-facing workspace operations.
///
/// Create and rename only touch the model and run inline. Anything that
/// changes tab visibility is validated here and queued on the dispatcher.
pub struct WorkspaceManager<S> {
    repo: Arc<Repository<S>>,
    bus: MessageBus,
    handle: CoreHandle,
}

impl<S: KeyValueStore> WorkspaceManager<S> {
    pub fn new(repo: Arc<Repository<S>>, bus: MessageBus, handle: CoreHandle) -> Self {
        Self { repo, bus, handle }
    }

    pub async fn list(&self) -> Result<Vec<Workspace>, CoreError> {
        list_workspaces(&self.repo).await
    }

    pub async fn get(&self, id: &WorkspaceId) -> Result<Option<Workspace>, CoreError> {
        Ok(self.list().await?.into_iter().find(|w| &w.id == id))
    }

    /// The active workspace id, if one is set.
    pub async fn active(&self) -> Result<Option<WorkspaceId>, CoreError> {
        Ok(self.repo.load_active().await?)
    }

    /// Create a workspace and queue its activation.
    pub async fn create(&self, name: &str) -> Result<Workspace, CoreError> {
        let workspace = create_workspace(&self.repo, name).await?;
        self.bus.refresh();
        self.handle.request_activation(workspace.id.clone());
        Ok(workspace)
    }

    pub async fn rename(&self, id: &WorkspaceId, name: &str) -> Result<bool, CoreError> {
        let renamed = rename_workspace(&self.repo, id, name).await?;
        if renamed {
            self.bus.refresh();
        }
        Ok(renamed)
    }

    /// Queue deletion of `id`. Returns `false` once the dispatcher has shut
    /// down.
    pub async fn delete(&self, id: &WorkspaceId) -> Result<bool, CoreError> {
        self.require(id).await?;
        Ok(self.handle.send(CoreEvent::DeleteRequested(id.clone())))
    }

    /// Queue a move of `tab_id` into `to`. Returns `false` once the
    /// dispatcher has shut down.
    pub async fn move_tab(&self, tab_id: TabId, to: &WorkspaceId) -> Result<bool, CoreError> {
        self.require(to).await?;
        Ok(self.handle.send(CoreEvent::MoveTabRequested {
            tab_id,
            to: to.clone(),
        }))
    }

    /// Ask the dispatcher to activate `id`. Returns `false` when `id` is
    /// already active and nothing was queued.
    pub async fn request_activation(&self, id: &WorkspaceId) -> Result<bool, CoreError> {
        if self.repo.load_active().await?.as_ref() == Some(id) {
            log::debug!("Workspace {} is already active", id);
            return Ok(false);
        }
        Ok(self.handle.request_activation(id.clone()))
    }

    async fn require(&self, id: &WorkspaceId) -> Result<(), CoreError> {
        match self.get(id).await? {
            Some(_) => Ok(()),
            None => Err(CoreError::UnknownWorkspace(id.clone())),
        }
    }
}
