//! Reconciler: activation of a workspace against live browser state.
//!
//! An activation re-reads everything it depends on (workspace list, open
//! tabs, holder validity) instead of trusting values from earlier calls,
//! prunes stale tab references from the model, and then hides every other
//! workspace's tabs before showing the target's. Hiding first means the old
//! and new tab sets are never visible together; the cost is a brief moment
//! where neither is.

use crate::error::CoreError;
use crate::messaging::MessageBus;
use crate::oracle::TabOracle;
use crate::visibility::{VisibilityController, VisibilityOutcome};
use std::collections::HashSet;
use std::sync::Arc;
use tabspace_store::{KeyValueStore, Repository, TabId, Workspace, WorkspaceId};

/// Tabs to reveal and tabs to tuck away for one activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilityPlan {
    pub show: Vec<TabId>,
    pub hide: Vec<TabId>,
}

/// Summary of a completed activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub workspace_id: WorkspaceId,
    pub plan: VisibilityPlan,
    /// Stale or duplicate tab references removed from the model.
    pub pruned: usize,
    pub hide: VisibilityOutcome,
    pub show: VisibilityOutcome,
}

/// Drop tab ids that are no longer open, and resolve tabs claimed by more
/// than one workspace in favour of the workspace that comes last.
///
/// Returns the number of references removed.
pub fn prune_stale(workspaces: &mut [Workspace], existing: &HashSet<TabId>) -> usize {
    let mut claimed: HashSet<TabId> = HashSet::new();
    let mut removed = 0;

    for workspace in workspaces.iter_mut().rev() {
        let mut seen = HashSet::new();
        let before = workspace.tabs.len();
        workspace
            .tabs
            .retain(|tab| existing.contains(tab) && !claimed.contains(tab) && seen.insert(*tab));
        removed += before - workspace.tabs.len();
        claimed.extend(seen);
    }

    removed
}

/// Split tabs into the target's (shown) and everyone else's (hidden).
///
/// Returns `None` when `target` is not in the list. Tabs tracked by no
/// workspace are left alone, and a tab is never in both sets.
pub fn partition(workspaces: &[Workspace], target: &WorkspaceId) -> Option<VisibilityPlan> {
    let active = workspaces.iter().find(|w| &w.id == target)?;
    let show = active.tabs.clone();
    let shown: HashSet<TabId> = show.iter().copied().collect();

    let mut hidden = HashSet::new();
    let hide = workspaces
        .iter()
        .filter(|w| &w.id != target)
        .flat_map(|w| w.tabs.iter().copied())
        .filter(|tab| !shown.contains(tab) && hidden.insert(*tab))
        .collect();

    Some(VisibilityPlan { show, hide })
}

/// Drives activations.
#[derive(Debug)]
pub struct Reconciler<S, O> {
    repo: Arc<Repository<S>>,
    oracle: Arc<O>,
    visibility: Arc<VisibilityController<S, O>>,
    bus: MessageBus,
}

impl<S: KeyValueStore, O: TabOracle> Reconciler<S, O> {
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

    /// Make `workspace_id` the active workspace.
    ///
    /// Store and tab-listing failures abort the activation before any tab is
    /// moved. Hide/show failures are absorbed by the visibility controller
    /// and reported in the returned [`Activation`].
    pub async fn activate(&self, workspace_id: &WorkspaceId) -> Result<Activation, CoreError> {
        let existing = self.oracle.tab_ids().await?;

        let (plan, pruned) = self
            .repo
            .modify_workspaces(|workspaces| {
                let pruned = prune_stale(workspaces, &existing);
                (partition(workspaces, workspace_id), pruned)
            })
            .await?;

        if pruned > 0 {
            log::info!("Pruned {} stale tab reference(s)", pruned);
        }

        let Some(plan) = plan else {
            log::warn!("Activation requested for unknown workspace {}", workspace_id);
            self.bus.refresh();
            return Err(CoreError::UnknownWorkspace(workspace_id.clone()));
        };

        self.repo.save_active(workspace_id).await?;

        log::info!(
            "Activating {}: showing {} tab(s), hiding {} tab(s)",
            workspace_id,
            plan.show.len(),
            plan.hide.len()
        );

        // Hide must finish before show starts.
        let hide = self.visibility.hide(&plan.hide).await;
        let show = self.visibility.show(&plan.show).await;

        self.bus.refresh();

        Ok(Activation {
            workspace_id: workspace_id.clone(),
            plan,
            pruned,
            hide,
            show,
        })
    }
}
