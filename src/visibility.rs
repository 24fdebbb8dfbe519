//! Visibility Controller: the `hide` and `show` primitives.
//!
//! Hiding moves tabs into a single collapsed "hidden holder" group; showing
//! ungroups them. The holder is created lazily and its id is cached in the
//! persisted model, but the cache is only a hint: it is revalidated against
//! the browser before every use and regenerated when it dangles.
//!
//! Both primitives are idempotent and never return an error. Expected drift
//! (tab already grouped, holder gone, no focused window, tab already closed)
//! is logged and absorbed; anything else is logged and the call is abandoned
//! without rolling back tabs that were already moved.

use crate::error::CoreError;
use crate::oracle::{GroupInfo, GroupUpdate, OracleError, TabOracle};
use std::sync::Arc;
use tabspace_config::Config;
use tabspace_store::{GroupId, KeyValueStore, Repository, TabId};

/// How the hidden holder is labelled and looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderSettings {
    /// Fixed display name of the holder group
    pub title: String,
    /// Collapse the holder when it is created
    pub collapsed: bool,
    /// Adopt a live group already titled `title` when the cache is unusable
    pub adopt_existing: bool,
}

impl HolderSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            title: config.hidden_group_title.clone(),
            collapsed: config.collapse_hidden_group,
            adopt_existing: config.adopt_existing_holder,
        }
    }
}

impl Default for HolderSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Why a visibility call did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No tab ids were given.
    Empty,
    /// The browser has no focused window to create the holder in.
    NoFocusedWindow,
}

/// Result of a `hide` or `show` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityOutcome {
    /// The browser now reflects the request.
    Applied,
    /// Nothing was attempted.
    Skipped(SkipReason),
    /// An unexpected failure stopped the call; the message is the logged error.
    Abandoned(String),
}

impl VisibilityOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, VisibilityOutcome::Applied)
    }
}

/// Owns the hidden holder and moves tabs in and out of it.
#[derive(Debug)]
pub struct VisibilityController<S, O> {
    repo: Arc<Repository<S>>,
    oracle: Arc<O>,
    settings: HolderSettings,
}

impl<S: KeyValueStore, O: TabOracle> VisibilityController<S, O> {
    pub fn new(repo: Arc<Repository<S>>, oracle: Arc<O>, settings: HolderSettings) -> Self {
        Self {
            repo,
            oracle,
            settings,
        }
    }

    pub fn settings(&self) -> &HolderSettings {
        &self.settings
    }

    /// Move `tab_ids` into the hidden holder, creating it if needed.
    pub async fn hide(&self, tab_ids: &[TabId]) -> VisibilityOutcome {
        if tab_ids.is_empty() {
            return VisibilityOutcome::Skipped(SkipReason::Empty);
        }

        let mut remaining = tab_ids.to_vec();
        loop {
            let offending = match self.place_in_holder(&remaining).await {
                Ok(holder) => {
                    log::debug!("Hid {} tab(s) in holder {}", remaining.len(), holder);
                    return VisibilityOutcome::Applied;
                }
                Err(CoreError::Oracle(OracleError::TabAlreadyInGroup(tab))) => {
                    log::debug!("Tab {} already in the hidden holder", tab);
                    tab
                }
                Err(CoreError::Oracle(OracleError::TabNotFound(tab))) => {
                    log::debug!("Tab {} closed before it could be hidden", tab);
                    tab
                }
                Err(CoreError::Oracle(OracleError::NoFocusedWindow)) => {
                    log::info!(
                        "No focused window, skipped hiding {} tab(s)",
                        remaining.len()
                    );
                    return VisibilityOutcome::Skipped(SkipReason::NoFocusedWindow);
                }
                Err(e) => {
                    log::error!("Error hiding tabs {:?}: {}", remaining, e);
                    return VisibilityOutcome::Abandoned(e.to_string());
                }
            };

            // Each retry drops one tab, so the loop ends.
            let before = remaining.len();
            remaining.retain(|t| *t != offending);
            if remaining.is_empty() {
                return VisibilityOutcome::Applied;
            }
            if remaining.len() == before {
                log::error!(
                    "Error hiding tabs {:?}: oracle rejected tab {} outside the batch",
                    remaining,
                    offending
                );
                return VisibilityOutcome::Abandoned(format!(
                    "tab {offending} rejected but not in batch"
                ));
            }
        }
    }

    /// Remove `tab_ids` from whatever group holds them.
    pub async fn show(&self, tab_ids: &[TabId]) -> VisibilityOutcome {
        if tab_ids.is_empty() {
            return VisibilityOutcome::Skipped(SkipReason::Empty);
        }

        match self.oracle.ungroup(tab_ids).await {
            Ok(()) => {
                log::debug!("Showed {} tab(s)", tab_ids.len());
                VisibilityOutcome::Applied
            }
            Err(OracleError::NotGrouped(tab)) => {
                log::debug!("Tab {} was not grouped", tab);
                VisibilityOutcome::Applied
            }
            Err(OracleError::TabNotFound(tab)) => {
                log::debug!("Tab {} closed before it could be shown", tab);
                self.show_surviving(tab_ids).await
            }
            Err(e) => {
                log::error!("Error showing tabs {:?}: {}", tab_ids, e);
                VisibilityOutcome::Abandoned(e.to_string())
            }
        }
    }

    /// Retry `show` with only the tabs that still exist.
    async fn show_surviving(&self, tab_ids: &[TabId]) -> VisibilityOutcome {
        let existing = match self.oracle.tab_ids().await {
            Ok(existing) => existing,
            Err(e) => {
                log::error!("Error listing tabs while showing {:?}: {}", tab_ids, e);
                return VisibilityOutcome::Abandoned(e.to_string());
            }
        };
        let surviving: Vec<TabId> = tab_ids
            .iter()
            .copied()
            .filter(|t| existing.contains(t))
            .collect();
        if surviving.is_empty() {
            return VisibilityOutcome::Applied;
        }

        match self.oracle.ungroup(&surviving).await {
            Ok(()) => VisibilityOutcome::Applied,
            Err(e) if e.is_recoverable() => {
                log::debug!("Ignoring drift while showing {:?}: {}", surviving, e);
                VisibilityOutcome::Applied
            }
            Err(e) => {
                log::error!("Error showing tabs {:?}: {}", surviving, e);
                VisibilityOutcome::Abandoned(e.to_string())
            }
        }
    }

    async fn place_in_holder(&self, tab_ids: &[TabId]) -> Result<GroupId, CoreError> {
        if let Some(holder) = self.valid_holder().await? {
            match self.oracle.group_tabs(tab_ids, Some(holder)).await {
                Ok(group) => return Ok(group),
                Err(OracleError::GroupNotFound(_)) => {
                    // Destroyed between validation and use.
                    log::warn!("Hidden holder {} vanished, recreating it", holder);
                    self.repo.clear_holder().await?;
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.create_holder(tab_ids).await
    }

    /// The cached holder if it still resolves, else an adoptable live group.
    ///
    /// A dangling cache entry is cleared.
    async fn valid_holder(&self) -> Result<Option<GroupId>, CoreError> {
        if let Some(cached) = self.repo.load_holder().await? {
            match self.oracle.group(cached).await {
                Ok(Some(info)) => {
                    self.ensure_labelled(&info).await;
                    return Ok(Some(cached));
                }
                Ok(None) | Err(OracleError::GroupNotFound(_)) => {
                    log::info!("Cached hidden holder {} no longer exists", cached);
                    self.repo.clear_holder().await?;
                }
                Err(e) => return Err(e.into()),
            }
        }

        if self.settings.adopt_existing
            && let Some(found) = self
                .oracle
                .groups_titled(&self.settings.title)
                .await?
                .into_iter()
                .next()
        {
            log::info!("Adopting existing hidden holder {}", found.id);
            self.repo.save_holder(found.id).await?;
            self.ensure_labelled(&found).await;
            return Ok(Some(found.id));
        }

        Ok(None)
    }

    /// Create a new holder seeded with `tab_ids`, cache it, then label it.
    ///
    /// A failed label is repaired the next time the holder is validated.
    async fn create_holder(&self, tab_ids: &[TabId]) -> Result<GroupId, CoreError> {
        let holder = self.oracle.group_tabs(tab_ids, None).await?;
        self.repo.save_holder(holder).await?;
        self.label(holder).await;
        log::info!("Created hidden holder {}", holder);
        Ok(holder)
    }

    /// Re-apply the configured title and collapsed state if `info` drifted.
    async fn ensure_labelled(&self, info: &GroupInfo) {
        if info.title.as_deref() == Some(self.settings.title.as_str())
            && info.collapsed == self.settings.collapsed
        {
            return;
        }
        log::info!("Hidden holder {} lost its label, re-applying it", info.id);
        self.label(info.id).await;
    }

    async fn label(&self, holder: GroupId) {
        let update = GroupUpdate {
            title: Some(self.settings.title.clone()),
            collapsed: Some(self.settings.collapsed),
        };
        if let Err(e) = self.oracle.update_group(holder, update).await {
            log::warn!("Failed to label hidden holder {}: {}", holder, e);
        }
    }
}
