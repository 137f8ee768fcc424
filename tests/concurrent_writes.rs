//! Concurrent Write Tests
//!
//! Racing read-modify-write operations on one table must never lose an
//! update: every committed row survives, and a column removal racing row
//! appends leaves no row carrying the removed key.

use std::sync::{Arc, Barrier};
use std::thread;

use serde_json::json;
use tabula::catalog::{CatalogError, CatalogService};
use tabula::config::ServiceConfig;
use tabula::schema::{ColumnDraft, Table};
use tabula::storage::{FileTableStore, MemoryTableStore, TableStore};
use tempfile::TempDir;

const WRITERS: usize = 8;
const ROWS_PER_WRITER: usize = 10;

fn config_with_retries(retries: u32) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.catalog.max_write_retries = retries;
    config
}

fn create_tasks(catalog: &CatalogService) -> Table {
    catalog
        .tables
        .create_table(
            "Tasks",
            vec![
                ColumnDraft::new("name", "text"),
                ColumnDraft::new("done", "checkbox"),
            ],
        )
        .unwrap()
}

/// Appends rows from many threads. Returns how many appends committed.
fn append_concurrently(catalog: &Arc<CatalogService>, table_id: uuid::Uuid) -> usize {
    let barrier = Arc::new(Barrier::new(WRITERS));
    let handles: Vec<_> = (0..WRITERS)
        .map(|writer| {
            let catalog = Arc::clone(catalog);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut committed = 0;
                for i in 0..ROWS_PER_WRITER {
                    let data = json!({"name": format!("w{}-{}", writer, i), "done": false});
                    match catalog.tables.add_row(table_id, &data) {
                        Ok(_) => committed += 1,
                        Err(CatalogError::Conflict { .. }) => {}
                        Err(other) => panic!("unexpected error: {:?}", other),
                    }
                }
                committed
            })
        })
        .collect();

    handles.into_iter().map(|h| h.join().unwrap()).sum()
}

#[test]
fn test_concurrent_appends_lose_nothing() {
    // Enough retries that every writer eventually wins
    let config = config_with_retries(1_000);
    let catalog = Arc::new(CatalogService::new(
        Arc::new(MemoryTableStore::new()),
        &config,
    ));
    let table = create_tasks(&catalog);

    let committed = append_concurrently(&catalog, table.id);
    assert_eq!(committed, WRITERS * ROWS_PER_WRITER);

    let stored = catalog.tables.get_table(table.id).unwrap();
    assert_eq!(stored.rows.len(), committed);
    assert_eq!(stored.version, table.version + committed as u64);
}

/// With few retries some appends may give up, but the stored rows always
/// match the appends that reported success.
#[test]
fn test_committed_appends_match_stored_rows() {
    let catalog = Arc::new(CatalogService::new(
        Arc::new(MemoryTableStore::new()),
        &config_with_retries(1),
    ));
    let table = create_tasks(&catalog);

    let committed = append_concurrently(&catalog, table.id);
    let stored = catalog.tables.get_table(table.id).unwrap();
    assert_eq!(stored.rows.len(), committed);
}

#[test]
fn test_concurrent_appends_on_file_store() {
    let temp = TempDir::new().unwrap();
    let store: Arc<dyn TableStore> = Arc::new(FileTableStore::open(temp.path()).unwrap());
    let catalog = Arc::new(CatalogService::new(store, &config_with_retries(1_000)));
    let table = create_tasks(&catalog);

    let committed = append_concurrently(&catalog, table.id);
    assert_eq!(committed, WRITERS * ROWS_PER_WRITER);
    assert_eq!(
        catalog.tables.get_table(table.id).unwrap().rows.len(),
        committed
    );
}

#[test]
fn test_remove_column_racing_appends() {
    let catalog = Arc::new(CatalogService::new(
        Arc::new(MemoryTableStore::new()),
        &config_with_retries(1_000),
    ));
    let table = create_tasks(&catalog);

    let appender = {
        let catalog = Arc::clone(&catalog);
        thread::spawn(move || {
            let mut committed = 0;
            let mut rejected = 0;
            for i in 0..50 {
                let data = json!({"name": format!("row {}", i), "done": true});
                match catalog.tables.add_row(table.id, &data) {
                    Ok(_) => committed += 1,
                    // Once `done` is gone the row names an unknown column
                    Err(CatalogError::Validation(_)) => rejected += 1,
                    Err(other) => panic!("unexpected error: {:?}", other),
                }
            }
            (committed, rejected)
        })
    };

    let remover = {
        let catalog = Arc::clone(&catalog);
        thread::spawn(move || catalog.columns.remove_column(table.id, "done"))
    };

    let (committed, rejected) = appender.join().unwrap();
    remover.join().unwrap().unwrap();
    assert_eq!(committed + rejected, 50);

    let stored = catalog.tables.get_table(table.id).unwrap();
    assert!(!stored.has_column("done"));
    assert_eq!(stored.rows.len(), committed);
    assert!(stored.rows.iter().all(|r| !r.data.contains_key("done")));
    assert!(stored.validate_structure().is_ok());
}
