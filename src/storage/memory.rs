//! In-memory table store

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::schema::Table;

use super::errors::{StorageError, StorageResult};
use super::store::{newest_first, TableStore};

/// Table store backed by a `HashMap` behind a `RwLock`.
///
/// Every call holds the lock for its whole duration, so `replace` is an
/// atomic compare-and-swap.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: RwLock<HashMap<Uuid, Table>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableStore for MemoryTableStore {
    fn insert(&self, mut table: Table) -> StorageResult<Table> {
        let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
        if tables.contains_key(&table.id) {
            return Err(StorageError::AlreadyExists(table.id));
        }
        table.version = 1;
        tables.insert(table.id, table.clone());
        Ok(table)
    }

    fn get(&self, id: &Uuid) -> StorageResult<Option<Table>> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(tables.get(id).cloned())
    }

    fn replace(&self, mut table: Table, expected_version: u64) -> StorageResult<Table> {
        let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
        let stored = tables
            .get_mut(&table.id)
            .ok_or(StorageError::NotFound(table.id))?;

        if stored.version != expected_version {
            return Err(StorageError::VersionConflict {
                id: table.id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        table.version = expected_version + 1;
        *stored = table.clone();
        Ok(table)
    }

    fn delete(&self, id: &Uuid) -> StorageResult<bool> {
        let mut tables = self.tables.write().map_err(|_| StorageError::LockPoisoned)?;
        Ok(tables.remove(id).is_some())
    }

    fn count(&self) -> StorageResult<usize> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(tables.len())
    }

    fn list(&self, skip: usize, limit: usize) -> StorageResult<Vec<Table>> {
        let tables = self.tables.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut all: Vec<&Table> = tables.values().collect();
        all.sort_by(|a, b| newest_first(a, b));
        Ok(all.into_iter().skip(skip).take(limit).cloned().collect())
    }
}
