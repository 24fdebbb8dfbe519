//! In-memory [`KeyValueStore`] used by tests and the simulation harness.

use crate::error::StoreError;
use crate::key_value::{KeyValueStore, StateKey};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Volatile store backed by a `HashMap`.
///
/// Writes can be made to fail with [`MemoryStore::set_fail_writes`] to
/// exercise the unexpected-error paths of callers.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StateKey, Value>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `set`/`remove` fail until reset.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set`/`remove` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Synchronous peek at a raw value, for assertions.
    pub fn snapshot(&self, key: StateKey) -> Option<Value> {
        self.entries.lock().get(&key).cloned()
    }

    fn check_writable(&self, key: StateKey) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "write to '{}' rejected",
                key.as_str()
            )));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: StateKey) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.lock().get(&key).cloned())
    }

    async fn set(&self, key: StateKey, value: Value) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.entries.lock().insert(key, value);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: StateKey) -> Result<(), StoreError> {
        self.check_writable(key)?;
        self.entries.lock().remove(&key);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
