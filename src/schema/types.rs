//! Table, column and row definitions
//!
//! Supported column types:
//! - text: any scalar
//! - number: JSON number
//! - date: calendar date or date-time
//! - select: one of the column's declared options
//! - checkbox: boolean
//! - relation: opaque identifier (format only)

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{SchemaError, SchemaResult};

/// Name of the column every table must carry.
pub const NAME_COLUMN: &str = "name";

/// Closed set of column types.
///
/// Declaration order matters: it is the index into the validator's
/// per-type lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Number,
    Date,
    Select,
    Checkbox,
    Relation,
}

impl ColumnType {
    /// Number of column types
    pub const COUNT: usize = 6;

    /// All column types in declaration order
    pub const ALL: [ColumnType; ColumnType::COUNT] = [
        ColumnType::Text,
        ColumnType::Number,
        ColumnType::Date,
        ColumnType::Select,
        ColumnType::Checkbox,
        ColumnType::Relation,
    ];

    /// Returns the type name used on the wire and in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Number => "number",
            ColumnType::Date => "date",
            ColumnType::Select => "select",
            ColumnType::Checkbox => "checkbox",
            ColumnType::Relation => "relation",
        }
    }

    /// Parses a wire type name
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.type_name() == name)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// A typed field descriptor attached to a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its table
    pub name: String,
    /// Column type
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    /// Allowed values, only meaningful for `select`
    #[serde(default)]
    pub options: Vec<String>,
    /// Whether rows must carry this column
    #[serde(default)]
    pub required: bool,
}

impl Column {
    /// Create an optional column without options
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            options: Vec::new(),
            required: false,
        }
    }

    /// Create an optional select column
    pub fn select<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            ..Self::new(name, ColumnType::Select)
        }
    }

    /// The mandatory `name` column injected into tables that lack one
    pub fn name_column() -> Self {
        Self::new(NAME_COLUMN, ColumnType::Text).required()
    }

    /// Marks the column as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Returns true for the mandatory `name` text column
    pub fn is_name_column(&self) -> bool {
        self.name == NAME_COLUMN && self.column_type == ColumnType::Text
    }
}

/// Unvalidated column definition as supplied by a caller.
///
/// Every field is optional so that a missing name or type is reported as a
/// schema error rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub column_type: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
}

impl ColumnDraft {
    pub fn new(name: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            column_type: Some(column_type.into()),
            ..Default::default()
        }
    }

    /// Resolves the draft into a column.
    ///
    /// # Errors
    ///
    /// Fails if the name is missing or blank, the type is missing or not
    /// one of the supported column types, a `select` column has no options,
    /// or options are given for any other type.
    pub fn resolve(self) -> SchemaResult<Column> {
        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(SchemaError::invalid_columns("Columns must have name and type")),
        };

        let type_name = match self.column_type.as_deref().map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Err(SchemaError::invalid_columns("Columns must have name and type")),
        };

        let column_type = ColumnType::parse(type_name).ok_or_else(|| {
            SchemaError::invalid_columns(format!(
                "Column '{}' has unsupported type '{}'",
                name, type_name
            ))
        })?;

        match (column_type, self.options.is_empty()) {
            (ColumnType::Select, true) => {
                return Err(SchemaError::invalid_columns(format!(
                    "Column '{}' of type 'select' must declare at least one option",
                    name
                )))
            }
            (ColumnType::Select, false) | (_, true) => {}
            (other, false) => {
                return Err(SchemaError::invalid_columns(format!(
                    "Column '{}' of type '{}' does not take options",
                    name, other
                )))
            }
        }

        Ok(Column {
            name,
            column_type,
            options: self.options,
            required: self.required,
        })
    }
}

impl From<Column> for ColumnDraft {
    fn from(column: Column) -> Self {
        Self {
            name: Some(column.name),
            column_type: Some(column.column_type.type_name().to_string()),
            options: column.options,
            required: column.required,
        }
    }
}

/// Row field values keyed by column name
pub type RowData = Map<String, Value>;

/// One record of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: Uuid,
    pub data: RowData,
}

impl Row {
    /// Creates a row with a fresh time-ordered id
    pub fn new(data: RowData) -> Self {
        Self {
            id: Uuid::now_v7(),
            data,
        }
    }
}

/// Table aggregate: columns and rows are owned exclusively by the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: Uuid,
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub rows: Vec<Row>,
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every write
    #[serde(default)]
    pub version: u64,
}

impl Table {
    /// Creates an unsaved table with no rows
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            columns,
            rows: Vec::new(),
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Checks the structural invariants of a stored table.
    ///
    /// - exactly one `name` column, of type text
    /// - column names are unique
    /// - every row key names an existing column
    pub fn validate_structure(&self) -> SchemaResult<()> {
        let name_columns: Vec<&Column> = self
            .columns
            .iter()
            .filter(|c| c.name == NAME_COLUMN)
            .collect();
        match name_columns.as_slice() {
            [column] if column.column_type == ColumnType::Text => {}
            [column] => {
                return Err(SchemaError::invalid_columns(format!(
                    "Column 'name' must have type 'text', found '{}'",
                    column.column_type
                )))
            }
            _ => {
                return Err(SchemaError::invalid_columns(
                    "Table must include exactly one \"name\" column with type \"text\"",
                ))
            }
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::duplicate_column(&column.name));
            }
        }

        for row in &self.rows {
            if let Some(key) = row.data.keys().find(|k| !seen.contains(k.as_str())) {
                return Err(SchemaError::unknown_field(key));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;
    use serde_json::json;

    fn tasks() -> Table {
        Table::new(
            "Tasks",
            vec![
                Column::new("name", ColumnType::Text),
                Column::new("done", ColumnType::Checkbox),
            ],
        )
    }

    #[test]
    fn test_column_type_names_round_trip() {
        for t in ColumnType::ALL {
            assert_eq!(ColumnType::parse(t.type_name()), Some(t));
        }
        assert_eq!(ColumnType::parse("Text"), None);
        assert_eq!(ColumnType::parse("string"), None);
    }

    #[test]
    fn test_column_wire_layout() {
        let column = Column::select("status", ["todo", "done"]).required();
        let value = serde_json::to_value(&column).unwrap();
        assert_eq!(
            value,
            json!({"name": "status", "type": "select", "options": ["todo", "done"], "required": true})
        );
    }

    #[test]
    fn test_column_defaults_when_omitted() {
        let column: Column = serde_json::from_value(json!({"name": "due", "type": "date"})).unwrap();
        assert!(column.options.is_empty());
        assert!(!column.required);
    }

    #[test]
    fn test_table_wire_layout_uses_camel_case() {
        let table = tasks();
        let value = serde_json::to_value(&table).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
        assert_eq!(value["columns"][1]["type"], "checkbox");
        assert_eq!(value["rows"], json!([]));
    }

    #[test]
    fn test_draft_resolves() {
        let column = ColumnDraft::new(" done ", "checkbox").resolve().unwrap();
        assert_eq!(column.name, "done");
        assert_eq!(column.column_type, ColumnType::Checkbox);
    }

    #[test]
    fn test_draft_missing_type_rejected() {
        let draft = ColumnDraft {
            name: Some("done".into()),
            ..Default::default()
        };
        let err = draft.resolve().unwrap_err();
        assert!(err.message().contains("name and type"));
    }

    #[test]
    fn test_draft_unknown_type_rejected() {
        let err = ColumnDraft::new("done", "boolean").resolve().unwrap_err();
        assert!(err.message().contains("boolean"));
    }

    #[test]
    fn test_select_draft_requires_options() {
        let draft = ColumnDraft {
            required: true,
            ..ColumnDraft::new("status", "select")
        };
        let err = draft.resolve().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::InvalidColumns);
        assert!(err.message().contains("at least one option"));

        let draft = ColumnDraft {
            options: vec!["todo".into()],
            ..ColumnDraft::new("status", "select")
        };
        assert_eq!(draft.resolve().unwrap().options, vec!["todo"]);
    }

    #[test]
    fn test_options_rejected_on_other_types() {
        let draft = ColumnDraft {
            options: vec!["yes".into()],
            ..ColumnDraft::new("done", "checkbox")
        };
        let err = draft.resolve().unwrap_err();
        assert!(err.message().contains("does not take options"));
    }

    #[test]
    fn test_structure_valid() {
        assert!(tasks().validate_structure().is_ok());
    }

    #[test]
    fn test_structure_requires_name_column() {
        let table = Table::new("t", vec![Column::new("done", ColumnType::Checkbox)]);
        assert!(table.validate_structure().is_err());
    }

    #[test]
    fn test_structure_rejects_non_text_name_column() {
        let table = Table::new("t", vec![Column::new("name", ColumnType::Number)]);
        let err = table.validate_structure().unwrap_err();
        assert!(err.message().contains("text"));
    }

    #[test]
    fn test_structure_rejects_stale_row_key() {
        let mut table = tasks();
        let mut data = RowData::new();
        data.insert("priority".into(), json!(1));
        table.rows.push(Row::new(data));
        let err = table.validate_structure().unwrap_err();
        assert_eq!(err.details().unwrap().field, "priority");
    }
}
