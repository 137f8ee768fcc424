//! Column lifecycle: adding columns to live tables and removing them along
//! with the values rows hold for them.

use std::sync::Arc;

use uuid::Uuid;

use crate::schema::{ColumnDraft, Table, NAME_COLUMN};
use crate::storage::TableStore;

use super::errors::{CatalogError, CatalogResult};
use super::versioned::update_table;

/// Adds and removes column definitions on stored tables.
///
/// Removal rewrites every row in the same aggregate write that drops the
/// column, so no reader sees one without the other.
pub struct ColumnLifecycleManager {
    store: Arc<dyn TableStore>,
    max_write_retries: u32,
}

impl ColumnLifecycleManager {
    pub fn new(store: Arc<dyn TableStore>, max_write_retries: u32) -> Self {
        Self {
            store,
            max_write_retries,
        }
    }

    /// Appends a column to an existing table.
    ///
    /// Existing rows are not touched; a required column only binds rows
    /// added after it.
    pub fn add_column(&self, table_id: Uuid, draft: ColumnDraft) -> CatalogResult<Table> {
        let column = draft.resolve()?;
        if column.name == NAME_COLUMN {
            return Err(CatalogError::ColumnExists(column.name));
        }

        let table = update_table(&self.store, table_id, self.max_write_retries, |table| {
            if table.has_column(&column.name) {
                return Err(CatalogError::ColumnExists(column.name.clone()));
            }
            table.columns.push(column.clone());
            Ok(())
        })?;

        tracing::info!(
            table_id = %table.id,
            column = %column.name,
            column_type = %column.column_type,
            "column added"
        );
        Ok(table)
    }

    /// Removes a column and strips its key from every row.
    ///
    /// # Errors
    ///
    /// - `MissingColumnName` for a blank column name
    /// - `ProtectedColumn` for `name`, whatever the table's state
    /// - `TableNotFound` / `ColumnNotFound` if either is absent
    pub fn remove_column(&self, table_id: Uuid, column_name: &str) -> CatalogResult<Table> {
        if column_name.trim().is_empty() {
            return Err(CatalogError::MissingColumnName);
        }
        if column_name == NAME_COLUMN {
            return Err(CatalogError::ProtectedColumn(column_name.to_string()));
        }

        let mut stripped = 0usize;
        let table = update_table(&self.store, table_id, self.max_write_retries, |table| {
            let before = table.columns.len();
            table.columns.retain(|c| c.name != column_name);
            if table.columns.len() == before {
                return Err(CatalogError::ColumnNotFound(column_name.to_string()));
            }

            stripped = 0;
            for row in &mut table.rows {
                if row.data.shift_remove(column_name).is_some() {
                    stripped += 1;
                }
            }

            Ok(table.validate_structure()?)
        })?;

        tracing::info!(
            table_id = %table.id,
            column = column_name,
            rows_stripped = stripped,
            "column removed"
        );
        Ok(table)
    }
}
