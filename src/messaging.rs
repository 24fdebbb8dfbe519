//! Fire-and-forget messaging between the core and the UI layer.
//!
//! Messages carry an `action` tag on the wire, e.g.
//! `{"action":"workspaceActivated","workspaceId":"workspace-1"}` and
//! `{"action":"refresh"}`. Delivery is best effort and at most once: there
//! is no correlation, acknowledgement or retry.

use serde::{Deserialize, Serialize};
use tabspace_store::WorkspaceId;
use tokio::sync::broadcast;

/// Default number of undelivered messages a slow subscriber may lag behind.
const DEFAULT_CAPACITY: usize = 64;

/// A message on the internal channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// Request to make a workspace active (UI to core).
    WorkspaceActivated {
        #[serde(rename = "workspaceId")]
        workspace_id: WorkspaceId,
    },
    /// The persisted model changed; re-read it (core to UI).
    Refresh,
}

/// Broadcast channel for outbound notifications.
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<Message>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MessageBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Receive every message sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.tx.subscribe()
    }

    /// Send without waiting. Returns whether any subscriber was listening;
    /// a message with no listener is dropped.
    pub fn send(&self, message: Message) -> bool {
        match self.tx.send(message) {
            Ok(receivers) => {
                log::trace!("Message delivered to {} subscriber(s)", receivers);
                true
            }
            Err(broadcast::error::SendError(message)) => {
                log::trace!("No subscriber for {:?}, dropped", message);
                false
            }
        }
    }

    /// Tell the UI layer to re-read the model.
    pub fn refresh(&self) {
        self.send(Message::Refresh);
    }
}
