//! Optimistic read-modify-write on a whole table aggregate.
//!
//! The table is read, changed in memory, and written back with the version it
//! was read at. If another writer bumped the version in between, the whole
//! cycle (including validation) runs again against the fresh copy.

use std::sync::Arc;

use uuid::Uuid;

use crate::schema::Table;
use crate::storage::{StorageError, TableStore};

use super::errors::{CatalogError, CatalogResult};

/// Applies `change` to the current copy of a table and persists it.
///
/// `change` may run more than once and must derive everything from the
/// table it is given. Errors it returns abort without writing.
pub(crate) fn update_table<F>(
    store: &Arc<dyn TableStore>,
    table_id: Uuid,
    max_retries: u32,
    mut change: F,
) -> CatalogResult<Table>
where
    F: FnMut(&mut Table) -> CatalogResult<()>,
{
    let attempts = max_retries.saturating_add(1);

    for attempt in 1..=attempts {
        let mut table = store
            .get(&table_id)?
            .ok_or(CatalogError::TableNotFound(table_id))?;
        let read_version = table.version;

        change(&mut table)?;

        match store.replace(table, read_version) {
            Ok(saved) => return Ok(saved),
            Err(e) if e.is_conflict() => {
                tracing::warn!(
                    table_id = %table_id,
                    attempt,
                    read_version,
                    error = %e,
                    "concurrent table write, retrying"
                );
            }
            // deleted between our read and write
            Err(StorageError::NotFound(_)) => return Err(CatalogError::TableNotFound(table_id)),
            Err(e) => return Err(e.into()),
        }
    }

    Err(CatalogError::Conflict { table_id, attempts })
}
