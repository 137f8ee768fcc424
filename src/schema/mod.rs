//! Table schema subsystem
//!
//! Column definitions and the rules row data must satisfy against them.
//!
//! # Design Principles
//!
//! - Every table carries exactly one `name` column of type text
//! - Row data is validated before any write
//! - Violations abort the write; no partial rows
//! - Validation is a pure function of columns and data

mod errors;
mod types;
mod validator;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, ValidationDetails};
pub use types::{Column, ColumnDraft, ColumnType, Row, RowData, Table, NAME_COLUMN};
pub use validator::{validate, RowValidator, UnknownFieldPolicy};
