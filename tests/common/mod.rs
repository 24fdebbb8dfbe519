//! Shared integration test helpers for tabspace.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{ids, seeded_engine, workspace};
//! ```
//!
//! The `#![allow(dead_code)]` suppresses warnings when a test file only uses
//! a subset of the helpers.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use tabspace::{Engine, SimulatedBrowser};
use tabspace_store::{MemoryStore, TabId, Workspace, WorkspaceId};

pub type TestEngine = Engine<MemoryStore, SimulatedBrowser>;

pub const HOLDER_TITLE: &str = "Inactive Workspaces";

pub fn ids(tabs: &[i64]) -> Vec<TabId> {
    tabs.iter().copied().map(TabId).collect()
}

pub fn workspace(id: &str, tabs: &[i64]) -> Workspace {
    let mut workspace = Workspace::new(WorkspaceId::new(id), id.to_uppercase());
    workspace.tabs = ids(tabs);
    workspace
}

/// A fresh engine over an in-memory store and a browser with `open_tabs`.
pub fn engine_with_tabs(open_tabs: &[i64]) -> (TestEngine, Arc<SimulatedBrowser>) {
    let browser = Arc::new(SimulatedBrowser::new());
    browser.seed_tabs(open_tabs);
    let engine = Engine::new(
        &tabspace_config::Config::default(),
        MemoryStore::new(),
        Arc::clone(&browser),
    );
    (engine, browser)
}

/// An engine whose model holds `workspaces`, with `active` as the active
/// pointer. Every tab referenced by a workspace is open and visible.
pub async fn seeded_engine(
    workspaces: Vec<Workspace>,
    active: Option<&str>,
) -> (TestEngine, Arc<SimulatedBrowser>) {
    let open: Vec<i64> = workspaces
        .iter()
        .flat_map(|w| w.tabs.iter().map(|t| t.0))
        .collect();
    let (engine, browser) = engine_with_tabs(&open);
    engine
        .repo
        .save_workspaces(&workspaces)
        .await
        .expect("seed workspaces");
    if let Some(active) = active {
        engine
            .repo
            .save_active(&WorkspaceId::new(active))
            .await
            .expect("seed active workspace");
    }
    (engine, browser)
}

pub async fn tabs_of(engine: &TestEngine, id: &str) -> Vec<TabId> {
    engine
        .repo
        .load_workspaces()
        .await
        .expect("load workspaces")
        .into_iter()
        .find(|w| w.id.as_str() == id)
        .map(|w| w.tabs)
        .unwrap_or_default()
}

/// Assert that no tab id is claimed by two workspaces.
pub async fn assert_unique_ownership(engine: &TestEngine) {
    let mut seen = HashSet::new();
    for workspace in engine.repo.load_workspaces().await.expect("load workspaces") {
        for tab in workspace.tabs {
            assert!(seen.insert(tab), "tab {} owned twice", tab);
        }
    }
}

/// Assert that every tab of `active` is visible and every tab of every other
/// workspace sits in the cached hidden holder.
pub async fn assert_partitioned(engine: &TestEngine, browser: &SimulatedBrowser, active: &str) {
    let holder = engine.repo.load_holder().await.expect("load holder");
    for workspace in engine.repo.load_workspaces().await.expect("load workspaces") {
        for tab in &workspace.tabs {
            if workspace.id.as_str() == active {
                assert_eq!(browser.group_of(*tab), None, "tab {} should be visible", tab);
            } else {
                assert!(holder.is_some(), "hidden tabs need a holder");
                assert_eq!(browser.group_of(*tab), holder, "tab {} should be hidden", tab);
            }
        }
    }
}
