//! Storage error types
//!
//! Error codes:
//! - TABULA_STORAGE_IO_ERROR
//! - TABULA_STORAGE_CORRUPT_RECORD
//! - TABULA_STORAGE_VERSION_CONFLICT
//! - TABULA_STORAGE_ALREADY_EXISTS
//! - TABULA_STORAGE_NOT_FOUND
//! - TABULA_STORAGE_LOCK_POISONED

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors raised by a table store
#[derive(Debug, Error)]
pub enum StorageError {
    /// Disk I/O failure
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A stored record could not be encoded or decoded
    #[error("Corrupt table record '{path}': {source}")]
    CorruptRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The stored version differs from the one the writer read
    #[error("Table {id} version conflict: expected {expected}, found {actual}")]
    VersionConflict { id: Uuid, expected: u64, actual: u64 },

    /// Insert of an id that is already stored
    #[error("Table {0} already exists")]
    AlreadyExists(Uuid),

    /// Replace of an id that is not stored
    #[error("Table {0} not found")]
    NotFound(Uuid),

    /// A store lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    LockPoisoned,
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::CorruptRecord {
            path: path.into(),
            source,
        }
    }

    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageError::Io { .. } => "TABULA_STORAGE_IO_ERROR",
            StorageError::CorruptRecord { .. } => "TABULA_STORAGE_CORRUPT_RECORD",
            StorageError::VersionConflict { .. } => "TABULA_STORAGE_VERSION_CONFLICT",
            StorageError::AlreadyExists(_) => "TABULA_STORAGE_ALREADY_EXISTS",
            StorageError::NotFound(_) => "TABULA_STORAGE_NOT_FOUND",
            StorageError::LockPoisoned => "TABULA_STORAGE_LOCK_POISONED",
        }
    }

    /// True when a concurrent writer won the race; the caller may retry
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::VersionConflict { .. })
    }
}
