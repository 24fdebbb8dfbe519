//! Workspace data model and persisted model store for tabspace.
//!
//! The store is a small asynchronous key-value seam ([`KeyValueStore`]) with
//! two implementations: [`MemoryStore`] for tests and simulation, and
//! [`JsonFileStore`] which keeps all keys in one versioned JSON document.
//! Components never talk to a store directly; they go through the typed
//! [`Repository`], which is also where workspace-list writes are serialized.

pub mod error;
pub mod file;
pub mod key_value;
pub mod memory;
pub mod model;
pub mod repository;

pub use error::StoreError;
pub use file::{JsonFileStore, SCHEMA_VERSION};
pub use key_value::{KeyValueStore, StateKey};
pub use memory::MemoryStore;
pub use model::{GroupId, TabId, Workspace, WorkspaceId};
pub use repository::Repository;
