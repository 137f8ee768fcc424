//! Table catalog subsystem for tabula
//!
//! Operations over stored table aggregates:
//! - SchemaStore: create/get/delete tables, append rows
//! - ColumnLifecycleManager: add/remove columns, cascading removal into rows
//! - TableCatalog: newest-first paginated listing
//!
//! Every mutation of an existing table is an optimistic read-modify-write
//! of the whole aggregate, retried when a concurrent writer wins.

mod columns;
mod errors;
mod listing;
mod schema_store;
mod versioned;

use std::sync::Arc;

pub use columns::ColumnLifecycleManager;
pub use errors::{CatalogError, CatalogResult};
pub use listing::{TableCatalog, TablePage};
pub use schema_store::SchemaStore;

use crate::config::ServiceConfig;
use crate::schema::RowValidator;
use crate::storage::TableStore;

/// The three catalog components wired to one store.
pub struct CatalogService {
    pub tables: SchemaStore,
    pub columns: ColumnLifecycleManager,
    pub listing: TableCatalog,
}

impl CatalogService {
    pub fn new(store: Arc<dyn TableStore>, config: &ServiceConfig) -> Self {
        let retries = config.catalog.max_write_retries;
        let validator = RowValidator::new(config.schema.unknown_fields);

        Self {
            tables: SchemaStore::new(store.clone(), validator, retries),
            columns: ColumnLifecycleManager::new(store.clone(), retries),
            listing: TableCatalog::new(
                store,
                config.catalog.default_page_limit,
                config.catalog.max_page_limit,
            ),
        }
    }
}
