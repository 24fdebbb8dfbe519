// Library exports for testing and embedding
//
// # Concurrency
//
// The engine runs as a single consumer (`dispatcher::Dispatcher`) over one
// event queue. Lock usage follows two rules:
//
//   - `tokio::sync::Mutex`: held across `.await`, e.g. the workspace-list
//     writer lock in `tabspace_store::Repository` and the file lock in
//     `JsonFileStore`.
//
//   - `parking_lot::Mutex`: sync-only state never held across `.await`
//     (`MemoryStore`, `SimulatedBrowser`, the debug log file).

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod cli;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod messaging;
pub mod oracle;
pub mod reconciler;
pub mod simulated;
pub mod visibility;
pub mod workspaces;

pub use dispatcher::{CoreEvent, CoreHandle, Dispatcher};
pub use engine::Engine;
pub use error::CoreError;
pub use ingestion::Ingestion;
pub use messaging::{Message, MessageBus};
pub use oracle::{GroupInfo, GroupUpdate, OracleError, TabEvent, TabOracle};
pub use reconciler::{Activation, Reconciler, VisibilityPlan};
pub use simulated::SimulatedBrowser;
pub use visibility::{HolderSettings, VisibilityController, VisibilityOutcome};
pub use workspaces::{Lifecycle, WorkspaceManager};
