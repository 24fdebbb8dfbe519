//! Single-consumer event loop for the workspace engine.
//!
//! Workspace requests and tab lifecycle events arrive on separate channels
//! and are handled one at a time, so no two handlers ever interleave their
//! read-modify-write cycles. Handler errors are logged here and go no
//! further.

use crate::error::CoreError;
use crate::ingestion::Ingestion;
use crate::messaging::Message;
use crate::oracle::{TabEvent, TabOracle};
use crate::reconciler::Reconciler;
use crate::workspaces::Lifecycle;
use tabspace_store::{KeyValueStore, TabId, WorkspaceId};
use tokio::sync::mpsc;

/// Work item for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreEvent {
    TabCreated(TabId),
    TabRemoved(TabId),
    ActivationRequested(WorkspaceId),
    DeleteRequested(WorkspaceId),
    MoveTabRequested { tab_id: TabId, to: WorkspaceId },
}

impl From<TabEvent> for CoreEvent {
    fn from(event: TabEvent) -> Self {
        match event {
            TabEvent::Created(id) => CoreEvent::TabCreated(id),
            TabEvent::Removed(id) => CoreEvent::TabRemoved(id),
        }
    }
}

/// Cloneable sender side of the dispatcher's request channel.
#[derive(Debug, Clone)]
pub struct CoreHandle {
    tx: mpsc::UnboundedSender<CoreEvent>,
}

impl CoreHandle {
    /// Queue an event. Returns `false` once the dispatcher has shut down.
    pub fn send(&self, event: CoreEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                log::warn!("Dispatcher stopped, dropped {:?}", event);
                false
            }
        }
    }

    pub fn request_activation(&self, workspace_id: WorkspaceId) -> bool {
        self.send(CoreEvent::ActivationRequested(workspace_id))
    }

    /// Route an inbound UI message. Refresh notices are outbound only and
    /// are ignored here.
    pub fn deliver(&self, message: Message) -> bool {
        match message {
            Message::WorkspaceActivated { workspace_id } => self.request_activation(workspace_id),
            Message::Refresh => false,
        }
    }
}

/// Owns the handlers and drains both event sources.
pub struct Dispatcher<S, O> {
    reconciler: Reconciler<S, O>,
    ingestion: Ingestion<S>,
    lifecycle: Lifecycle<S, O>,
    requests: mpsc::UnboundedReceiver<CoreEvent>,
    tab_events: mpsc::UnboundedReceiver<TabEvent>,
}

impl<S: KeyValueStore, O: TabOracle> Dispatcher<S, O> {
    /// Build a dispatcher subscribed to `oracle`'s tab events. The returned
    /// handle feeds the request channel.
    pub fn new(
        reconciler: Reconciler<S, O>,
        ingestion: Ingestion<S>,
        lifecycle: Lifecycle<S, O>,
        oracle: &O,
    ) -> (Self, CoreHandle) {
        let (tx, requests) = mpsc::unbounded_channel();
        let dispatcher = Self {
            reconciler,
            ingestion,
            lifecycle,
            requests,
            tab_events: oracle.subscribe(),
        };
        (dispatcher, CoreHandle { tx })
    }

    pub fn reconciler(&self) -> &Reconciler<S, O> {
        &self.reconciler
    }

    pub fn ingestion(&self) -> &Ingestion<S> {
        &self.ingestion
    }

    pub fn lifecycle(&self) -> &Lifecycle<S, O> {
        &self.lifecycle
    }

    /// Run one event to completion. Errors are logged, never returned.
    pub async fn handle(&self, event: CoreEvent) {
        debug_trace!("dispatch", "Dispatching {:?}", event);
        let result = match &event {
            CoreEvent::TabCreated(id) => self.ingestion.on_tab_created(*id).await.map(|_| ()),
            CoreEvent::TabRemoved(id) => self.ingestion.on_tab_removed(*id).await.map(|_| ()),
            CoreEvent::ActivationRequested(id) => self.reconciler.activate(id).await.map(|_| ()),
            CoreEvent::DeleteRequested(id) => self.lifecycle.delete(id).await.map(|_| ()),
            CoreEvent::MoveTabRequested { tab_id, to } => {
                self.lifecycle.move_tab(*tab_id, to).await
            }
        };

        match result {
            Ok(()) => {}
            // Removed by an earlier event in the queue.
            Err(CoreError::UnknownWorkspace(id)) => {
                debug_log!("dispatch", "Dropped {:?}, workspace {} is gone", event, id)
            }
            Err(e) => debug_error!("dispatch", "Failed to handle {:?}: {}", event, e),
        }
    }

    /// Process events until every sender is gone.
    ///
    /// Tab lifecycle events take priority over queued activations so an
    /// activation sees tabs that were opened before it was handled.
    pub async fn run(mut self) {
        debug_info!("dispatch", "Workspace dispatcher started");
        loop {
            let event = tokio::select! {
                biased;
                Some(event) = self.tab_events.recv() => CoreEvent::from(event),
                Some(event) = self.requests.recv() => event,
                else => break,
            };
            self.handle(event).await;
        }
        debug_info!("dispatch", "Workspace dispatcher stopped");
    }

    /// Handle everything already queued, then return the number of events
    /// processed. Does not wait for new events.
    pub async fn run_until_idle(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let event = match self.tab_events.try_recv() {
                Ok(event) => CoreEvent::from(event),
                Err(_) => match self.requests.try_recv() {
                    Ok(event) => event,
                    Err(_) => break,
                },
            };
            self.handle(event).await;
            handled += 1;
        }
        handled
    }
}
