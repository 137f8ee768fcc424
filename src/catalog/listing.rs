//! Paginated table listing.

use std::sync::Arc;

use serde::Serialize;

use crate::schema::Table;
use crate::storage::TableStore;

use super::errors::{CatalogError, CatalogResult};

/// One page of tables plus the overall table count.
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub items: Vec<Table>,
    pub total: usize,
}

/// Lists tables newest first with offset pagination.
///
/// `total` and `items` come from two separate store reads. Under concurrent
/// creation or deletion the count may not match the page it accompanies;
/// callers get a best-effort snapshot, not a consistent one.
pub struct TableCatalog {
    store: Arc<dyn TableStore>,
    default_limit: usize,
    max_limit: usize,
}

impl TableCatalog {
    pub fn new(store: Arc<dyn TableStore>, default_limit: usize, max_limit: usize) -> Self {
        Self {
            store,
            default_limit,
            max_limit,
        }
    }

    /// Returns tables ranked by descending creation time at positions
    /// `[skip, skip + limit)`.
    pub fn list_tables(&self, limit: Option<usize>, skip: Option<usize>) -> CatalogResult<TablePage> {
        let limit = limit.unwrap_or(self.default_limit);
        let skip = skip.unwrap_or(0);

        if limit == 0 || limit > self.max_limit {
            return Err(CatalogError::InvalidPagination(format!(
                "limit must be between 1 and {}",
                self.max_limit
            )));
        }

        let items = self.store.list(skip, limit)?;
        let total = self.store.count()?;

        tracing::debug!(limit, skip, returned = items.len(), total, "tables listed");
        Ok(TablePage { items, total })
    }
}
