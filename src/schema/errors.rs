//! Schema error types
//!
//! Error codes:
//! - TABULA_MALFORMED_ROW
//! - TABULA_UNKNOWN_FIELD
//! - TABULA_MISSING_FIELD
//! - TABULA_TYPE_MISMATCH
//! - TABULA_INVALID_COLUMNS
//! - TABULA_DUPLICATE_COLUMN
//! - TABULA_MISSING_TABLE_NAME
//!
//! All schema errors reject the request; nothing is persisted.

use std::fmt;

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Row data is not a field-name-to-value mapping
    MalformedRow,
    /// Row data names a column the table does not have
    UnknownField,
    /// A required column is absent from row data
    MissingField,
    /// A value does not satisfy its column type
    TypeMismatch,
    /// Column definitions are malformed
    InvalidColumns,
    /// Two columns share a name
    DuplicateColumn,
    /// Table name missing or blank
    MissingTableName,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::MalformedRow => "TABULA_MALFORMED_ROW",
            SchemaErrorCode::UnknownField => "TABULA_UNKNOWN_FIELD",
            SchemaErrorCode::MissingField => "TABULA_MISSING_FIELD",
            SchemaErrorCode::TypeMismatch => "TABULA_TYPE_MISMATCH",
            SchemaErrorCode::InvalidColumns => "TABULA_INVALID_COLUMNS",
            SchemaErrorCode::DuplicateColumn => "TABULA_DUPLICATE_COLUMN",
            SchemaErrorCode::MissingTableName => "TABULA_MISSING_TABLE_NAME",
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Offending field name
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::new(field, "a column of this table", "unknown column")
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "non-null value", "null")
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}': expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// Schema error with code, message and optional field details
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    details: Option<ValidationDetails>,
}

impl SchemaError {
    fn with_details(code: SchemaErrorCode, details: ValidationDetails) -> Self {
        Self {
            code,
            message: format!("Row validation failed: {}", details),
            details: Some(details),
        }
    }

    /// Row data is not an object
    pub fn malformed_row(actual: impl Into<String>) -> Self {
        let actual = actual.into();
        Self {
            code: SchemaErrorCode::MalformedRow,
            message: format!("Row data must be an object, got {}", actual),
            details: Some(ValidationDetails::new("$data", "object", actual)),
        }
    }

    /// Row data names no existing column
    pub fn unknown_field(field: impl Into<String>) -> Self {
        Self::with_details(
            SchemaErrorCode::UnknownField,
            ValidationDetails::unknown_field(field),
        )
    }

    /// Required column absent
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::with_details(
            SchemaErrorCode::MissingField,
            ValidationDetails::missing_field(field),
        )
    }

    /// Value does not satisfy the column type
    pub fn type_mismatch(details: ValidationDetails) -> Self {
        Self::with_details(SchemaErrorCode::TypeMismatch, details)
    }

    /// Malformed column definitions
    pub fn invalid_columns(reason: impl Into<String>) -> Self {
        Self {
            code: SchemaErrorCode::InvalidColumns,
            message: reason.into(),
            details: None,
        }
    }

    /// Duplicate column name
    pub fn duplicate_column(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: SchemaErrorCode::DuplicateColumn,
            message: format!("Duplicate column name '{}'", name),
            details: Some(ValidationDetails::new(name, "unique column name", "duplicate")),
        }
    }

    /// Table name missing
    pub fn missing_table_name() -> Self {
        Self {
            code: SchemaErrorCode::MissingTableName,
            message: "Table name is required".into(),
            details: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns validation details if applicable
    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
