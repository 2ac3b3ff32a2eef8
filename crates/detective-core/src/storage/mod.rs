//! # State Storage
//!
//! Durable client storage for persisted snapshots, keyed by a fixed string
//! (`office-detective-game`, `office-detective-auth`, `office-detective-board`).
//!
//! ## Backends
//!
//! - `MemoryStorage`: volatile map, used by tests and `--ephemeral` runs
//! - `RedbStorage`: redb embedded database, ACID write per save
//!
//! Both stores share one backend handle, so the trait takes `&self` and
//! implementations synchronize internally.

mod redb_storage;

pub use redb_storage::RedbStorage;

use crate::DetectiveError;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Key-value storage for serialized state snapshots.
pub trait StateStorage: Send + Sync {
    /// Read the bytes stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, DetectiveError>;

    /// Replace the bytes stored under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), DetectiveError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), DetectiveError>;
}

/// Storage handle shared by the game store and the auth store.
pub type SharedStorage = Arc<dyn StateStorage>;

/// Volatile in-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a shared handle.
    #[must_use]
    pub fn shared() -> SharedStorage {
        Arc::new(Self::new())
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Vec<u8>>>, DetectiveError> {
        self.entries
            .lock()
            .map_err(|_| DetectiveError::StorageError("memory storage lock poisoned".to_string()))
    }
}

impl StateStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, DetectiveError> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), DetectiveError> {
        self.entries()?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DetectiveError> {
        self.entries()?.remove(key);
        Ok(())
    }
}
