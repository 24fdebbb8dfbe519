//! The Live Tab Oracle: the browser's authoritative view of tabs and groups.
//!
//! Everything persisted in the model is reconciled against this interface and
//! never trusted on its own. Implementations wrap the browser's tab and tab
//! group APIs; [`crate::simulated::SimulatedBrowser`] is an in-memory one.

use std::collections::HashSet;
use std::future::Future;
use tabspace_store::{GroupId, TabId};
use thiserror::Error;
use tokio::sync::mpsc;

/// Snapshot of a live tab group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub id: GroupId,
    pub title: Option<String>,
    pub collapsed: bool,
}

/// Properties to change on a group. `None` leaves a property untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupUpdate {
    pub title: Option<String>,
    pub collapsed: Option<bool>,
}

/// Tab lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabEvent {
    Created(TabId),
    Removed(TabId),
}

/// Failures reported by the browser.
///
/// Every variant except [`OracleError::Other`] is normal drift between the
/// persisted model and the live browser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// The tab is already inside the group it was asked to join.
    #[error("tab {0} is already in the target group")]
    TabAlreadyInGroup(TabId),

    /// The group id no longer resolves to a live group.
    #[error("no group with id {0}")]
    GroupNotFound(GroupId),

    /// There is no focused window to create a group in.
    #[error("no focused browser window")]
    NoFocusedWindow,

    /// The tab id no longer resolves to an open tab.
    #[error("no tab with id {0}")]
    TabNotFound(TabId),

    /// The tab is not in any group.
    #[error("tab {0} is not in a group")]
    NotGrouped(TabId),

    /// Anything else the browser reports.
    #[error("browser error: {0}")]
    Other(String),
}

impl OracleError {
    /// Whether the failure is expected drift rather than a fault.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, OracleError::Other(_))
    }
}

/// Asynchronous access to live tab state.
pub trait TabOracle: Send + Sync {
    /// Ids of every open tab.
    fn tab_ids(&self) -> impl Future<Output = Result<HashSet<TabId>, OracleError>> + Send;

    /// Look a group up by id. `Ok(None)` when it no longer exists.
    fn group(
        &self,
        id: GroupId,
    ) -> impl Future<Output = Result<Option<GroupInfo>, OracleError>> + Send;

    /// Every live group whose title equals `title`.
    fn groups_titled(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<Vec<GroupInfo>, OracleError>> + Send;

    /// Move tabs into `group`, or into a newly created group when `group`
    /// is `None`. Returns the id of the group the tabs ended up in.
    fn group_tabs(
        &self,
        tab_ids: &[TabId],
        group: Option<GroupId>,
    ) -> impl Future<Output = Result<GroupId, OracleError>> + Send;

    /// Change a group's title or collapsed state.
    fn update_group(
        &self,
        id: GroupId,
        update: GroupUpdate,
    ) -> impl Future<Output = Result<GroupInfo, OracleError>> + Send;

    /// Remove tabs from whatever group holds them.
    fn ungroup(&self, tab_ids: &[TabId]) -> impl Future<Output = Result<(), OracleError>> + Send;

    /// Subscribe to tab created/removed notifications.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<TabEvent>;
}
