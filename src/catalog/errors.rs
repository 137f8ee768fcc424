//! # Catalog Errors
//!
//! Error types for table, row and column operations.

use thiserror::Error;
use uuid::Uuid;

use crate::schema::SchemaError;
use crate::storage::StorageError;

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog operation errors
#[derive(Debug, Error)]
pub enum CatalogError {
    // ==================
    // Client Errors
    // ==================
    /// Table definition or row data violates the schema
    #[error("{0}")]
    Validation(#[from] SchemaError),

    /// Table id does not exist
    #[error("Table not found")]
    TableNotFound(Uuid),

    /// Column does not exist on the table
    #[error("Column not found")]
    ColumnNotFound(String),

    /// Column name already taken on the table
    #[error("Column '{0}' already exists")]
    ColumnExists(String),

    /// The mandatory `name` column cannot be removed
    #[error("Column '{0}' is protected and cannot be removed")]
    ProtectedColumn(String),

    /// Column name missing from a column operation
    #[error("Column name is required")]
    MissingColumnName,

    /// Page window out of range
    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    /// Lost the optimistic write race on every attempt
    #[error("Table {table_id} was modified concurrently; gave up after {attempts} attempts")]
    Conflict { table_id: Uuid, attempts: u32 },

    // ==================
    // Server Errors
    // ==================
    /// Storage collaborator failed
    #[error("Storage failure: {0}")]
    Storage(#[from] StorageError),
}
