//! Table store contract
//!
//! A store keeps whole table aggregates keyed by id. Every mutation after
//! insert goes through `replace`, which is a compare-and-swap on the table's
//! version token.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::schema::Table;

use super::errors::StorageResult;

/// Identifier-keyed collection of table aggregates.
pub trait TableStore: Send + Sync {
    /// Stores a new table at version 1 and returns the stored copy.
    fn insert(&self, table: Table) -> StorageResult<Table>;

    /// Fetches a table by id.
    fn get(&self, id: &Uuid) -> StorageResult<Option<Table>>;

    /// Overwrites a stored table if its version still equals
    /// `expected_version`; the stored copy gets `expected_version + 1`.
    ///
    /// Fails with `VersionConflict` if another writer got there first and
    /// with `NotFound` if the table was deleted meanwhile.
    fn replace(&self, table: Table, expected_version: u64) -> StorageResult<Table>;

    /// Removes a table. Returns false if it did not exist.
    fn delete(&self, id: &Uuid) -> StorageResult<bool>;

    /// Number of stored tables.
    fn count(&self) -> StorageResult<usize>;

    /// Page of tables, newest first.
    fn list(&self, skip: usize, limit: usize) -> StorageResult<Vec<Table>>;
}

/// Newest first; ties on the timestamp fall back to the time-ordered id.
pub(crate) fn newest_first(a: &Table, b: &Table) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}
