//! Typed error type for the workspace engine.
//!
//! These errors stay inside the core: top-level handlers log them and the UI
//! layer only ever observes state through refresh notifications.

use crate::oracle::OracleError;
use tabspace_store::{StoreError, WorkspaceId};
use thiserror::Error;

/// Failures of a core operation.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The persisted model could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The browser rejected a call.
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// No workspace with the given id exists.
    #[error("Unknown workspace '{0}'")]
    UnknownWorkspace(WorkspaceId),

    /// A workspace name was empty after trimming.
    #[error("Workspace name must not be empty")]
    EmptyName,
}
