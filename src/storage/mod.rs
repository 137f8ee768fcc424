//! Table storage subsystem for tabula
//!
//! Holds whole table aggregates keyed by id. The schema layer never talks to
//! a backend directly, only to the `TableStore` trait.
//!
//! # Design Principles
//!
//! - Whole-aggregate writes (no per-row patches)
//! - Every write after insert is a compare-and-swap on the version token
//! - Listing is newest first

mod errors;
mod file;
mod memory;
mod store;

use std::sync::Arc;

pub use errors::{StorageError, StorageResult};
pub use file::FileTableStore;
pub use memory::MemoryTableStore;
pub use store::TableStore;

use crate::config::{StorageBackend, StorageConfig};

/// Opens the backend selected by the configuration.
pub fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn TableStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryTableStore::new())),
        StorageBackend::File => Ok(Arc::new(FileTableStore::open(config.data_dir())?)),
    }
}
