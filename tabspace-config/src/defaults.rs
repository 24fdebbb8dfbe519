//! Default value functions for configuration.
//!
//! Used as `#[serde(default = "crate::defaults::...")]` attributes on
//! `Config` fields.

/// Title given to the tab group that holds every inactive workspace's tabs.
pub const HIDDEN_GROUP_TITLE: &str = "Inactive Workspaces";

pub fn bool_true() -> bool {
    true
}

pub fn hidden_group_title() -> String {
    HIDDEN_GROUP_TITLE.to_string()
}
