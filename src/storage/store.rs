use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};
use thiserror::Error;

use super::snapshot::PersistedQueue;

/// The one table this app keeps, created on first open if absent.
const STORE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("app-state");

/// The single record key inside [`STORE_TABLE`].
const STATE_KEY: &str = "queue";

/// Errors raised by the queue store. Write-request failures and
/// transaction-commit failures stay distinct rather than being merged.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not open queue store: {0}")]
    Open(String),
    #[error("could not read queue record: {0}")]
    Read(String),
    #[error("could not write queue record: {0}")]
    Write(String),
    #[error("could not commit queue transaction: {0}")]
    Commit(String),
    #[error("could not encode queue snapshot: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Single-record store over an embedded database file.
///
/// Each operation opens a fresh connection, performs exactly one operation
/// inside one transaction, and drops the connection when the transaction
/// completes; no connection is kept open across calls.
#[derive(Debug, Clone)]
pub struct QueueStore {
    path: PathBuf,
}

impl QueueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<Database, StorageError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| StorageError::Open(e.to_string()))?;
        }

        // Creates the database file on first use; existing files open as-is.
        Database::create(&self.path).map_err(|e| StorageError::Open(e.to_string()))
    }

    /// Load the persisted snapshot, or `None` when nothing was ever saved.
    pub fn load(&self) -> Result<Option<PersistedQueue>, StorageError> {
        let db = self.open()?;
        let txn = db
            .begin_read()
            .map_err(|e| StorageError::Read(e.to_string()))?;

        let table = match txn.open_table(STORE_TABLE) {
            Ok(table) => table,
            // A database that has never been written has no table yet.
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(StorageError::Read(e.to_string())),
        };

        let Some(raw) = table
            .get(STATE_KEY)
            .map_err(|e| StorageError::Read(e.to_string()))?
        else {
            return Ok(None);
        };

        let snapshot = serde_json::from_slice(raw.value())?;
        Ok(Some(snapshot))
    }

    /// Overwrite the single record with `snapshot`.
    pub fn save(&self, snapshot: &PersistedQueue) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(snapshot)?;

        let db = self.open()?;
        let txn = db
            .begin_write()
            .map_err(|e| StorageError::Write(e.to_string()))?;
        {
            let mut table = txn
                .open_table(STORE_TABLE)
                .map_err(|e| StorageError::Write(e.to_string()))?;
            table
                .insert(STATE_KEY, bytes.as_slice())
                .map_err(|e| StorageError::Write(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Commit(e.to_string()))
    }

    /// Delete the single record, leaving the store itself in place.
    pub fn clear(&self) -> Result<(), StorageError> {
        let db = self.open()?;
        let txn = db
            .begin_write()
            .map_err(|e| StorageError::Write(e.to_string()))?;
        {
            let mut table = txn
                .open_table(STORE_TABLE)
                .map_err(|e| StorageError::Write(e.to_string()))?;
            table
                .remove(STATE_KEY)
                .map_err(|e| StorageError::Write(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Commit(e.to_string()))
    }
}
