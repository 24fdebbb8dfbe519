//! Workspace data model.
//!
//! Tab and group ids are the browser's integer ids. They are only meaningful
//! while the browser object they name exists, so nothing here assumes they
//! are still valid.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Id of an open browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

/// Id of a browser-native tab group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable workspace identifier of the form `workspace-<unix millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    const PREFIX: &'static str = "workspace-";

    /// Wrap an existing id string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id from the current time that does not collide with
    /// any workspace in `existing`.
    pub fn generate(existing: &[Workspace]) -> Self {
        Self::generate_at(chrono::Utc::now().timestamp_millis(), existing)
    }

    /// Generate an id for the given timestamp, bumping it until it is unused.
    pub fn generate_at(millis: i64, existing: &[Workspace]) -> Self {
        let mut stamp = millis;
        loop {
            let candidate = Self(format!("{}{}", Self::PREFIX, stamp));
            if !existing.iter().any(|w| w.id == candidate) {
                return candidate;
            }
            stamp += 1;
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A named, ordered collection of tab references.
///
/// `tabs` keeps insertion order for display; visibility logic does not
/// depend on it. A tab id belongs to at most one workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: WorkspaceId,
    pub name: String,
    #[serde(default)]
    pub tabs: Vec<TabId>,
}

impl Workspace {
    pub fn new(id: WorkspaceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tabs: Vec::new(),
        }
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.tabs.contains(&tab_id)
    }

    /// Remove the first occurrence of `tab_id`. Returns whether it was present.
    pub fn remove_tab(&mut self, tab_id: TabId) -> bool {
        match self.tabs.iter().position(|t| *t == tab_id) {
            Some(index) => {
                self.tabs.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Find the workspace holding `tab_id`, if any.
pub fn owner_of(workspaces: &[Workspace], tab_id: TabId) -> Option<&Workspace> {
    workspaces.iter().find(|w| w.contains(tab_id))
}
