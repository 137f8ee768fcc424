//! JSON file table store
//!
//! Layout: `<data_dir>/tables/<table_id>.json`, one file per table.
//!
//! - Writes go to `<table_id>.json.tmp` and are renamed into place, so a
//!   reader never sees a half-written aggregate
//! - Mutations are serialized by a store-wide mutex, making the version
//!   check and the rename one atomic step within the process

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use uuid::Uuid;

use crate::schema::Table;

use super::errors::{StorageError, StorageResult};
use super::store::{newest_first, TableStore};

/// Table store that keeps each aggregate in its own JSON file.
#[derive(Debug)]
pub struct FileTableStore {
    table_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileTableStore {
    /// Opens (creating if needed) the store under `data_dir`.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let table_dir = data_dir.join("tables");
        fs::create_dir_all(&table_dir).map_err(|e| StorageError::io(&table_dir, e))?;
        Ok(Self {
            table_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Returns the directory holding table files.
    pub fn table_dir(&self) -> &Path {
        &self.table_dir
    }

    fn table_path(&self, id: &Uuid) -> PathBuf {
        self.table_dir.join(format!("{}.json", id))
    }

    fn read_table(&self, path: &Path) -> StorageResult<Option<Table>> {
        let content = match fs::read(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::io(path, e)),
        };
        serde_json::from_slice(&content)
            .map(Some)
            .map_err(|e| StorageError::corrupt(path, e))
    }

    fn write_table(&self, table: &Table) -> StorageResult<()> {
        let path = self.table_path(&table.id);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_vec_pretty(table).map_err(|e| StorageError::corrupt(&path, e))?;
        fs::write(&tmp, content).map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &path).map_err(|e| StorageError::io(&path, e))
    }

    /// Paths of all table files, skipping temp files and anything else.
    fn table_files(&self) -> StorageResult<Vec<PathBuf>> {
        let entries =
            fs::read_dir(&self.table_dir).map_err(|e| StorageError::io(&self.table_dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StorageError::io(&self.table_dir, e))?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }
}

impl TableStore for FileTableStore {
    fn insert(&self, mut table: Table) -> StorageResult<Table> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        if self.table_path(&table.id).exists() {
            return Err(StorageError::AlreadyExists(table.id));
        }
        table.version = 1;
        self.write_table(&table)?;
        Ok(table)
    }

    fn get(&self, id: &Uuid) -> StorageResult<Option<Table>> {
        self.read_table(&self.table_path(id))
    }

    fn replace(&self, mut table: Table, expected_version: u64) -> StorageResult<Table> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        let stored = self
            .read_table(&self.table_path(&table.id))?
            .ok_or(StorageError::NotFound(table.id))?;

        if stored.version != expected_version {
            return Err(StorageError::VersionConflict {
                id: table.id,
                expected: expected_version,
                actual: stored.version,
            });
        }

        table.version = expected_version + 1;
        self.write_table(&table)?;
        Ok(table)
    }

    fn delete(&self, id: &Uuid) -> StorageResult<bool> {
        let _guard = self.write_lock.lock().map_err(|_| StorageError::LockPoisoned)?;
        let path = self.table_path(id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn count(&self) -> StorageResult<usize> {
        Ok(self.table_files()?.len())
    }

    fn list(&self, skip: usize, limit: usize) -> StorageResult<Vec<Table>> {
        let mut tables = Vec::new();
        for path in self.table_files()? {
            // deleted between the directory scan and the read
            if let Some(table) = self.read_table(&path)? {
                tables.push(table);
            }
        }
        tables.sort_by(newest_first);
        Ok(tables.into_iter().skip(skip).take(limit).collect())
    }
}
