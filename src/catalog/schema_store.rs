//! Table creation, lookup and row appends.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::schema::{Column, ColumnDraft, Row, RowValidator, SchemaError, Table, NAME_COLUMN};
use crate::storage::TableStore;

use super::errors::{CatalogError, CatalogResult};
use super::versioned::update_table;

/// Creates and fetches table aggregates and appends validated rows.
pub struct SchemaStore {
    store: Arc<dyn TableStore>,
    validator: RowValidator,
    max_write_retries: u32,
}

impl SchemaStore {
    pub fn new(store: Arc<dyn TableStore>, validator: RowValidator, max_write_retries: u32) -> Self {
        Self {
            store,
            validator,
            max_write_retries,
        }
    }

    /// Creates a table from caller-supplied column definitions.
    ///
    /// A `name` text column is appended if the definitions lack one; this is
    /// the only place it is ever added.
    ///
    /// # Errors
    ///
    /// - blank table name (TABULA_MISSING_TABLE_NAME)
    /// - a column without name or with an unsupported type (TABULA_INVALID_COLUMNS)
    /// - a `name` column whose type is not text (TABULA_INVALID_COLUMNS)
    /// - two columns sharing a name (TABULA_DUPLICATE_COLUMN)
    pub fn create_table(&self, name: &str, columns: Vec<ColumnDraft>) -> CatalogResult<Table> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SchemaError::missing_table_name().into());
        }

        let columns = with_name_column(resolve_columns(columns)?)?;
        let table = Table::new(name, columns);
        table.validate_structure()?;

        let table = self.store.insert(table)?;
        tracing::info!(
            table_id = %table.id,
            table = %table.name,
            columns = table.columns.len(),
            "table created"
        );
        Ok(table)
    }

    /// Fetches a table by id.
    pub fn get_table(&self, table_id: Uuid) -> CatalogResult<Table> {
        self.store
            .get(&table_id)?
            .ok_or(CatalogError::TableNotFound(table_id))
    }

    /// Validates `data` against the table's current columns and appends it
    /// as a new row.
    pub fn add_row(&self, table_id: Uuid, data: &Value) -> CatalogResult<Table> {
        let validator = self.validator;
        let table = update_table(&self.store, table_id, self.max_write_retries, |table| {
            let data = validator.validate(&table.columns, data)?;
            table.rows.push(Row::new(data));
            Ok(())
        })?;

        tracing::info!(table_id = %table.id, rows = table.rows.len(), "row added");
        Ok(table)
    }

    /// Deletes a table and everything it owns.
    pub fn delete_table(&self, table_id: Uuid) -> CatalogResult<()> {
        if !self.store.delete(&table_id)? {
            return Err(CatalogError::TableNotFound(table_id));
        }
        tracing::info!(table_id = %table_id, "table deleted");
        Ok(())
    }
}

/// Resolves drafts into columns, rejecting duplicate names.
pub(crate) fn resolve_columns(drafts: Vec<ColumnDraft>) -> CatalogResult<Vec<Column>> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(drafts.len() + 1);

    for draft in drafts {
        let column = draft.resolve()?;
        if !seen.insert(column.name.clone()) {
            return Err(SchemaError::duplicate_column(column.name).into());
        }
        columns.push(column);
    }

    Ok(columns)
}

/// Appends the mandatory `name` column unless the caller already defined it.
fn with_name_column(mut columns: Vec<Column>) -> CatalogResult<Vec<Column>> {
    match columns.iter().find(|c| c.name == NAME_COLUMN) {
        Some(column) if !column.is_name_column() => Err(SchemaError::invalid_columns(format!(
            "Column 'name' must have type 'text', found '{}'",
            column.column_type
        ))
        .into()),
        Some(_) => Ok(columns),
        None => {
            columns.push(Column::name_column());
            Ok(columns)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnType, SchemaErrorCode, UnknownFieldPolicy};
    use crate::storage::MemoryTableStore;
    use serde_json::json;

    fn schema_store() -> SchemaStore {
        SchemaStore::new(Arc::new(MemoryTableStore::new()), RowValidator::default(), 3)
    }

    fn tasks(store: &SchemaStore) -> Table {
        store
            .create_table(
                "Tasks",
                vec![
                    ColumnDraft::new("name", "text"),
                    ColumnDraft::new("done", "checkbox"),
                ],
            )
            .unwrap()
    }

    fn schema_code(err: CatalogError) -> SchemaErrorCode {
        match err {
            CatalogError::Validation(e) => e.code(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_keeps_supplied_name_column() {
        let store = schema_store();
        let table = tasks(&store);

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "done"]);
        assert!(!table.columns[0].required);
        assert_eq!(table.version, 1);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_create_injects_name_column() {
        let store = schema_store();
        let table = store
            .create_table("Books", vec![ColumnDraft::new("pages", "number")])
            .unwrap();

        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.columns[1], Column::name_column());
        assert!(table.columns[1].required);
    }

    #[test]
    fn test_create_with_no_columns() {
        let store = schema_store();
        let table = store.create_table("Empty", vec![]).unwrap();
        assert_eq!(table.columns, vec![Column::name_column()]);
    }

    #[test]
    fn test_create_rejects_non_text_name_column() {
        let store = schema_store();
        let err = store
            .create_table("Bad", vec![ColumnDraft::new("name", "number")])
            .unwrap_err();
        assert_eq!(schema_code(err), SchemaErrorCode::InvalidColumns);
    }

    #[test]
    fn test_create_rejects_duplicate_columns() {
        let store = schema_store();
        let err = store
            .create_table(
                "Bad",
                vec![ColumnDraft::new("done", "checkbox"), ColumnDraft::new("done", "text")],
            )
            .unwrap_err();
        assert_eq!(schema_code(err), SchemaErrorCode::DuplicateColumn);
    }

    #[test]
    fn test_create_rejects_blank_name() {
        let store = schema_store();
        let err = store.create_table("   ", vec![]).unwrap_err();
        assert_eq!(schema_code(err), SchemaErrorCode::MissingTableName);
    }

    #[test]
    fn test_create_rejects_untyped_column() {
        let store = schema_store();
        let draft = ColumnDraft {
            name: Some("done".into()),
            ..Default::default()
        };
        let err = store.create_table("Bad", vec![draft]).unwrap_err();
        assert_eq!(schema_code(err), SchemaErrorCode::InvalidColumns);
    }

    #[test]
    fn test_add_row_appends_normalized_data() {
        let store = schema_store();
        let table = tasks(&store);

        let updated = store
            .add_row(table.id, &json!({"name": "Buy milk", "done": true}))
            .unwrap();
        assert_eq!(updated.rows.len(), 1);
        assert_eq!(updated.rows[0].data["done"], json!(true));
        assert_eq!(updated.version, 2);
    }

    #[test]
    fn test_add_row_rejection_leaves_table_unchanged() {
        let store = schema_store();
        let table = tasks(&store);

        let err = store.add_row(table.id, &json!({"done": "yes"})).unwrap_err();
        assert_eq!(schema_code(err), SchemaErrorCode::TypeMismatch);

        let reread = store.get_table(table.id).unwrap();
        assert!(reread.rows.is_empty());
        assert_eq!(reread.version, 1);
    }

    #[test]
    fn test_add_row_unknown_table() {
        let store = schema_store();
        let err = store.add_row(Uuid::now_v7(), &json!({"name": "x"})).unwrap_err();
        assert!(matches!(err, CatalogError::TableNotFound(_)));
    }

    #[test]
    fn test_add_row_drop_policy() {
        let store = SchemaStore::new(
            Arc::new(MemoryTableStore::new()),
            RowValidator::new(UnknownFieldPolicy::Drop),
            3,
        );
        let table = tasks(&store);
        let updated = store
            .add_row(table.id, &json!({"name": "a", "colour": "red"}))
            .unwrap();
        assert!(!updated.rows[0].data.contains_key("colour"));
    }

    #[test]
    fn test_delete_table() {
        let store = schema_store();
        let table = tasks(&store);
        store.delete_table(table.id).unwrap();
        assert!(matches!(
            store.get_table(table.id),
            Err(CatalogError::TableNotFound(_))
        ));
        assert!(store.delete_table(table.id).is_err());
    }

    #[test]
    fn test_name_column_type_is_text() {
        let store = schema_store();
        let table = tasks(&store);
        assert_eq!(table.column("name").unwrap().column_type, ColumnType::Text);
    }
}
