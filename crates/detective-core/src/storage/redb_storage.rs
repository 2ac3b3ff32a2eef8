//! # redb-backed State Storage
//!
//! Persists state snapshots in a redb embedded database:
//! - ACID transactions (one write transaction per save)
//! - Crash safety (copy-on-write B-trees)
//! - Zero configuration
//!
//! A redb file can only be opened once per process, so the game store and
//! the auth store share a single `RedbStorage` through `SharedStorage`.

use super::StateStorage;
use crate::DetectiveError;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::path::Path;

/// Table for snapshots: storage key -> JSON bytes
const STATE: TableDefinition<&str, &[u8]> = TableDefinition::new("state");

fn storage_error(e: impl std::fmt::Display) -> DetectiveError {
    DetectiveError::StorageError(e.to_string())
}

/// A disk-backed snapshot store using redb.
pub struct RedbStorage {
    db: Database,
}

impl std::fmt::Debug for RedbStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStorage").finish_non_exhaustive()
    }
}

impl RedbStorage {
    /// Open or create a state database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DetectiveError> {
        let db = Database::create(path.as_ref()).map_err(storage_error)?;

        // Initialize the table so reads never hit a missing table
        {
            let write_txn = db.begin_write().map_err(storage_error)?;
            let _ = write_txn.open_table(STATE).map_err(storage_error)?;
            write_txn.commit().map_err(storage_error)?;
        }

        Ok(Self { db })
    }

    /// Keys currently stored, in order.
    pub fn keys(&self) -> Result<Vec<String>, DetectiveError> {
        let read_txn = self.db.begin_read().map_err(storage_error)?;
        let table = read_txn.open_table(STATE).map_err(storage_error)?;
        let mut keys = Vec::new();
        for entry in table.iter().map_err(storage_error)? {
            let (key, _) = entry.map_err(storage_error)?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }
}

impl StateStorage for RedbStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, DetectiveError> {
        let read_txn = self.db.begin_read().map_err(storage_error)?;
        let table = read_txn.open_table(STATE).map_err(storage_error)?;
        let bytes = table
            .get(key)
            .map_err(storage_error)?
            .map(|guard| guard.value().to_vec());
        Ok(bytes)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), DetectiveError> {
        let write_txn = self.db.begin_write().map_err(storage_error)?;
        {
            let mut table = write_txn.open_table(STATE).map_err(storage_error)?;
            table.insert(key, bytes).map_err(storage_error)?;
        }
        write_txn.commit().map_err(storage_error)
    }

    fn remove(&self, key: &str) -> Result<(), DetectiveError> {
        let write_txn = self.db.begin_write().map_err(storage_error)?;
        {
            let mut table = write_txn.open_table(STATE).map_err(storage_error)?;
            table.remove(key).map_err(storage_error)?;
        }
        write_txn.commit().map_err(storage_error)
    }
}
