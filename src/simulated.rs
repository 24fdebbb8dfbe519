//! In-memory browser used by tests and the `demo` subcommand.
//!
//! Mirrors the parts of browser tab-group behaviour the engine depends on:
//! grouping requires a focused window, a group disappears when its last tab
//! leaves it, and unknown tab or group ids are errors. Mutating calls are
//! recorded so callers can assert on ordering.

use crate::oracle::{GroupInfo, GroupUpdate, OracleError, TabEvent, TabOracle};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};
use tabspace_store::{GroupId, TabId};
use tokio::sync::mpsc;

/// A mutating call received by the simulated browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleCall {
    GroupTabs {
        tab_ids: Vec<TabId>,
        group: Option<GroupId>,
    },
    UpdateGroup {
        group: GroupId,
        update: GroupUpdate,
    },
    Ungroup {
        tab_ids: Vec<TabId>,
    },
}

/// Operation selector for [`SimulatedBrowser::fail_next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OracleOp {
    TabIds,
    Group,
    GroupTabs,
    UpdateGroup,
    Ungroup,
}

#[derive(Debug)]
struct BrowserState {
    /// Open tabs and the group each one is in.
    tabs: BTreeMap<TabId, Option<GroupId>>,
    groups: BTreeMap<GroupId, GroupInfo>,
    next_tab: i64,
    next_group: i64,
    focused_window: bool,
    faults: HashMap<OracleOp, OracleError>,
    calls: Vec<OracleCall>,
    subscribers: Vec<mpsc::UnboundedSender<TabEvent>>,
}

impl BrowserState {
    fn take_fault(&mut self, op: OracleOp) -> Result<(), OracleError> {
        match self.faults.remove(&op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn require_tabs(&self, tab_ids: &[TabId]) -> Result<(), OracleError> {
        match tab_ids.iter().find(|id| !self.tabs.contains_key(id)) {
            Some(missing) => Err(OracleError::TabNotFound(*missing)),
            None => Ok(()),
        }
    }

    /// Drop groups that no longer hold any tab.
    fn prune_empty_groups(&mut self) {
        let occupied: HashSet<GroupId> = self.tabs.values().flatten().copied().collect();
        self.groups.retain(|id, _| occupied.contains(id));
    }

    fn emit(&mut self, event: TabEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }
}

/// Simulated browser implementing [`TabOracle`].
#[derive(Debug)]
pub struct SimulatedBrowser {
    state: Mutex<BrowserState>,
}

impl Default for SimulatedBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBrowser {
    /// An empty browser with a focused window.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(BrowserState {
                tabs: BTreeMap::new(),
                groups: BTreeMap::new(),
                next_tab: 1,
                next_group: 1,
                focused_window: true,
                faults: HashMap::new(),
                calls: Vec::new(),
                subscribers: Vec::new(),
            }),
        }
    }

    /// Add tabs with specific ids without emitting events.
    pub fn seed_tabs(&self, ids: &[i64]) {
        let mut state = self.state.lock();
        for &id in ids {
            state.tabs.insert(TabId(id), None);
            state.next_tab = state.next_tab.max(id + 1);
        }
    }

    /// Open a new tab and notify subscribers.
    pub fn open_tab(&self) -> TabId {
        let mut state = self.state.lock();
        let id = TabId(state.next_tab);
        state.next_tab += 1;
        state.tabs.insert(id, None);
        state.emit(TabEvent::Created(id));
        id
    }

    /// Open a tab with a chosen id and notify subscribers.
    pub fn open_tab_with_id(&self, id: i64) -> TabId {
        let mut state = self.state.lock();
        let id = TabId(id);
        state.tabs.insert(id, None);
        state.next_tab = state.next_tab.max(id.0 + 1);
        state.emit(TabEvent::Created(id));
        id
    }

    /// Close a tab and notify subscribers. Returns whether it existed.
    pub fn close_tab(&self, id: TabId) -> bool {
        let mut state = self.state.lock();
        if state.tabs.remove(&id).is_none() {
            return false;
        }
        state.prune_empty_groups();
        state.emit(TabEvent::Removed(id));
        true
    }

    /// Close a tab without notifying anyone, as if the event were lost.
    pub fn close_tab_silently(&self, id: TabId) {
        let mut state = self.state.lock();
        state.tabs.remove(&id);
        state.prune_empty_groups();
    }

    /// Ungroup every tab of a group, as a user would from the browser UI.
    pub fn destroy_group(&self, id: GroupId) {
        let mut state = self.state.lock();
        for group in state.tabs.values_mut() {
            if *group == Some(id) {
                *group = None;
            }
        }
        state.groups.remove(&id);
    }

    pub fn set_focused_window(&self, focused: bool) {
        self.state.lock().focused_window = focused;
    }

    /// Make the next call of `op` fail with `err`.
    pub fn fail_next(&self, op: OracleOp, err: OracleError) {
        self.state.lock().faults.insert(op, err);
    }

    /// Group currently holding `tab`, if any.
    pub fn group_of(&self, tab: TabId) -> Option<GroupId> {
        self.state.lock().tabs.get(&tab).copied().flatten()
    }

    pub fn tabs_in_group(&self, id: GroupId) -> Vec<TabId> {
        self.state
            .lock()
            .tabs
            .iter()
            .filter(|(_, group)| **group == Some(id))
            .map(|(tab, _)| *tab)
            .collect()
    }

    pub fn group_info(&self, id: GroupId) -> Option<GroupInfo> {
        self.state.lock().groups.get(&id).cloned()
    }

    pub fn groups(&self) -> Vec<GroupInfo> {
        self.state.lock().groups.values().cloned().collect()
    }

    /// Tabs not inside any group.
    pub fn ungrouped_tabs(&self) -> Vec<TabId> {
        self.state
            .lock()
            .tabs
            .iter()
            .filter(|(_, group)| group.is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Mutating calls received so far, in order.
    pub fn calls(&self) -> Vec<OracleCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }
}

impl TabOracle for SimulatedBrowser {
    async fn tab_ids(&self) -> Result<HashSet<TabId>, OracleError> {
        let mut state = self.state.lock();
        state.take_fault(OracleOp::TabIds)?;
        Ok(state.tabs.keys().copied().collect())
    }

    async fn group(&self, id: GroupId) -> Result<Option<GroupInfo>, OracleError> {
        let mut state = self.state.lock();
        state.take_fault(OracleOp::Group)?;
        Ok(state.groups.get(&id).cloned())
    }

    async fn groups_titled(&self, title: &str) -> Result<Vec<GroupInfo>, OracleError> {
        let state = self.state.lock();
        Ok(state
            .groups
            .values()
            .filter(|g| g.title.as_deref() == Some(title))
            .cloned()
            .collect())
    }

    async fn group_tabs(
        &self,
        tab_ids: &[TabId],
        group: Option<GroupId>,
    ) -> Result<GroupId, OracleError> {
        let mut state = self.state.lock();
        state.calls.push(OracleCall::GroupTabs {
            tab_ids: tab_ids.to_vec(),
            group,
        });
        state.take_fault(OracleOp::GroupTabs)?;
        if tab_ids.is_empty() {
            return Err(OracleError::Other("tabIds must not be empty".to_string()));
        }
        state.require_tabs(tab_ids)?;

        let target = match group {
            Some(id) => {
                if !state.groups.contains_key(&id) {
                    return Err(OracleError::GroupNotFound(id));
                }
                id
            }
            None => {
                if !state.focused_window {
                    return Err(OracleError::NoFocusedWindow);
                }
                let id = GroupId(state.next_group);
                state.next_group += 1;
                state.groups.insert(
                    id,
                    GroupInfo {
                        id,
                        title: None,
                        collapsed: false,
                    },
                );
                id
            }
        };

        for tab in tab_ids {
            state.tabs.insert(*tab, Some(target));
        }
        state.prune_empty_groups();
        Ok(target)
    }

    async fn update_group(&self, id: GroupId, update: GroupUpdate) -> Result<GroupInfo, OracleError> {
        let mut state = self.state.lock();
        state.calls.push(OracleCall::UpdateGroup {
            group: id,
            update: update.clone(),
        });
        state.take_fault(OracleOp::UpdateGroup)?;
        let group = state
            .groups
            .get_mut(&id)
            .ok_or(OracleError::GroupNotFound(id))?;
        if let Some(title) = update.title {
            group.title = Some(title);
        }
        if let Some(collapsed) = update.collapsed {
            group.collapsed = collapsed;
        }
        Ok(group.clone())
    }

    async fn ungroup(&self, tab_ids: &[TabId]) -> Result<(), OracleError> {
        let mut state = self.state.lock();
        state.calls.push(OracleCall::Ungroup {
            tab_ids: tab_ids.to_vec(),
        });
        state.take_fault(OracleOp::Ungroup)?;
        state.require_tabs(tab_ids)?;
        for tab in tab_ids {
            state.tabs.insert(*tab, None);
        }
        state.prune_empty_groups();
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<TabEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.state.lock().subscribers.push(tx);
        rx
    }
}
