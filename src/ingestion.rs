//! Event Ingestion: incremental model upkeep from tab lifecycle events.
//!
//! Each handler only touches the workspace list, never tab visibility, and
//! makes a single read-modify-write through the repository.

use crate::error::CoreError;
use crate::messaging::MessageBus;
use std::sync::Arc;
use tabspace_store::model::owner_of;
use tabspace_store::{KeyValueStore, Repository, TabId, WorkspaceId};

/// Handlers for tab created/removed notifications.
#[derive(Debug)]
pub struct Ingestion<S> {
    repo: Arc<Repository<S>>,
    bus: MessageBus,
}

impl<S: KeyValueStore> Ingestion<S> {
    pub fn new(repo: Arc<Repository<S>>, bus: MessageBus) -> Self {
        Self { repo, bus }
    }

    /// Append a new tab to the active workspace.
    ///
    /// Returns the workspace that received the tab, or `None` when no
    /// workspace is active, the active pointer dangles, or the tab is
    /// already tracked somewhere.
    pub async fn on_tab_created(&self, tab_id: TabId) -> Result<Option<WorkspaceId>, CoreError> {
        let Some(active) = self.repo.load_active().await? else {
            log::trace!("Tab {} created with no active workspace", tab_id);
            return Ok(None);
        };

        let appended = self
            .repo
            .modify_workspaces(|workspaces| {
                if let Some(owner) = owner_of(workspaces, tab_id) {
                    log::debug!("Tab {} already belongs to {}", tab_id, owner.id);
                    return false;
                }
                match workspaces.iter_mut().find(|w| w.id == active) {
                    Some(workspace) => {
                        workspace.tabs.push(tab_id);
                        true
                    }
                    None => false,
                }
            })
            .await?;

        if !appended {
            return Ok(None);
        }

        log::debug!("Tab {} added to {}", tab_id, active);
        self.bus.refresh();
        Ok(Some(active))
    }

    /// Forget a closed tab.
    ///
    /// Returns the workspace it was removed from, or `None` when no
    /// workspace tracked it.
    pub async fn on_tab_removed(&self, tab_id: TabId) -> Result<Option<WorkspaceId>, CoreError> {
        let owner = self
            .repo
            .modify_workspaces(|workspaces| {
                workspaces
                    .iter_mut()
                    .find(|w| w.contains(tab_id))
                    .map(|workspace| {
                        workspace.remove_tab(tab_id);
                        workspace.id.clone()
                    })
            })
            .await?;

        match &owner {
            Some(id) => {
                log::debug!("Tab {} removed from {}", tab_id, id);
                self.bus.refresh();
            }
            None => log::trace!("Closed tab {} was not tracked", tab_id),
        }
        Ok(owner)
    }
}
