//! Wiring for a complete engine instance.

use crate::dispatcher::{CoreHandle, Dispatcher};
use crate::ingestion::Ingestion;
use crate::messaging::MessageBus;
use crate::oracle::TabOracle;
use crate::reconciler::Reconciler;
use crate::visibility::{HolderSettings, VisibilityController};
use crate::workspaces::{Lifecycle, WorkspaceManager};
use std::sync::Arc;
use tabspace_config::Config;
use tabspace_store::{KeyValueStore, Repository};

/// Every component of the engine, sharing one repository, oracle and bus.
///
/// The dispatcher is returned by value so the caller decides whether to
/// spawn [`Dispatcher::run`] or drive it step by step with
/// [`Dispatcher::run_until_idle`].
pub struct Engine<S, O> {
    pub repo: Arc<Repository<S>>,
    pub oracle: Arc<O>,
    pub bus: MessageBus,
    pub visibility: Arc<VisibilityController<S, O>>,
    pub workspaces: WorkspaceManager<S>,
    pub handle: CoreHandle,
    pub dispatcher: Dispatcher<S, O>,
}

impl<S: KeyValueStore, O: TabOracle> Engine<S, O> {
    pub fn new(config: &Config, store: S, oracle: Arc<O>) -> Self {
        Self::with_settings(HolderSettings::from_config(config), store, oracle)
    }

    pub fn with_settings(settings: HolderSettings, store: S, oracle: Arc<O>) -> Self {
        let repo = Arc::new(Repository::new(store));
        let bus = MessageBus::default();
        let visibility = Arc::new(VisibilityController::new(
            Arc::clone(&repo),
            Arc::clone(&oracle),
            settings,
        ));

        let reconciler = Reconciler::new(
            Arc::clone(&repo),
            Arc::clone(&oracle),
            Arc::clone(&visibility),
            bus.clone(),
        );
        let ingestion = Ingestion::new(Arc::clone(&repo), bus.clone());
        let lifecycle = Lifecycle::new(
            Arc::clone(&repo),
            Arc::clone(&oracle),
            Arc::clone(&visibility),
            bus.clone(),
        );
        let (dispatcher, handle) =
            Dispatcher::new(reconciler, ingestion, lifecycle, oracle.as_ref());

        let workspaces = WorkspaceManager::new(Arc::clone(&repo), bus.clone(), handle.clone());

        debug_log!(
            "engine",
            "Engine wired with holder title {:?}",
            visibility.settings().title
        );

        Self {
            repo,
            oracle,
            bus,
            visibility,
            workspaces,
            handle,
            dispatcher,
        }
    }
}
