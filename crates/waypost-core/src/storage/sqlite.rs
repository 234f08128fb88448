//! SQLite backend
//!
//! Records live in a single `addresses` table. The highest id ever issued
//! is kept in `schema_info` and bumped in the same transaction as each
//! insert, so a restart never hands out an id that was used before.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::schema::{get_schema_version, init_schema, needs_init, ISSUED_IDS_KEY, SCHEMA_VERSION};
use super::{AddressBackend, StorageError, StorageResult};
use crate::models::{AddressId, AddressRecord};

/// Persistent backend over a SQLite database
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open or create the database at `path`
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::from_io(e, parent.to_path_buf()))?;
            }
        }

        let conn = Connection::open(path)?;
        Self::prepare(conn, path.to_path_buf())
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::prepare(conn, PathBuf::from(":memory:"))
    }

    fn prepare(conn: Connection, path: PathBuf) -> StorageResult<Self> {
        if let Some(found) = get_schema_version(&conn).ok().flatten() {
            if found > SCHEMA_VERSION {
                return Err(StorageError::UnsupportedSchema {
                    path,
                    found,
                    supported: SCHEMA_VERSION,
                });
            }
        }

        if needs_init(&conn) {
            debug!(path = %path.display(), "initializing address schema");
            init_schema(&conn)?;
        }

        Ok(Self { conn })
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<AddressRecord> {
    let id: u64 = row.get(0)?;
    Ok(AddressRecord::new(AddressId::new(id), row.get(1)?, row.get(2)?))
}

fn read_issued_ids(conn: &Connection) -> StorageResult<u64> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM schema_info WHERE key = ?",
            [ISSUED_IDS_KEY],
            |row| row.get(0),
        )
        .optional()?;

    match value {
        None => Ok(0),
        Some(v) => v.parse().map_err(|_| StorageError::CorruptRow {
            table: "schema_info",
            details: format!("{ISSUED_IDS_KEY} is not a number: '{v}'"),
        }),
    }
}

impl AddressBackend for SqliteBackend {
    fn load_all(&self) -> StorageResult<Vec<AddressRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, label, details FROM addresses ORDER BY id ASC")?;

        let rows = stmt.query_map([], record_from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn get(&self, id: AddressId) -> StorageResult<Option<AddressRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT id, label, details FROM addresses WHERE id = ?",
                params![id.get()],
                record_from_row,
            )
            .optional()?;
        Ok(record)
    }

    fn insert(&mut self, record: &AddressRecord) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO addresses (id, label, details) VALUES (?, ?, ?)",
            params![record.id().get(), record.label(), record.details()],
        )?;

        let issued = read_issued_ids(&tx)?.max(record.id().get());
        tx.execute(
            "INSERT OR REPLACE INTO schema_info (key, value) VALUES (?, ?)",
            params![ISSUED_IDS_KEY, issued.to_string()],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn remove(&mut self, id: AddressId) -> StorageResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM addresses WHERE id = ?", params![id.get()])?;
        Ok(removed > 0)
    }

    fn issued_ids(&self) -> StorageResult<u64> {
        read_issued_ids(&self.conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(id: u64, label: &str, details: &str) -> AddressRecord {
        AddressRecord::new(AddressId::new(id), label.to_string(), details.to_string())
    }

    #[test]
    fn test_insert_and_load() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.insert(&record(2, "Office", "Lat: 1.5, Lng: 2.5")).unwrap();
        backend.insert(&record(1, "Home", "Lat: 12.34, Lng: 56.78")).unwrap();

        let records = backend.load_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].label(), "Home");
        assert_eq!(records[1].details(), "Lat: 1.5, Lng: 2.5");
        assert_eq!(backend.issued_ids().unwrap(), 2);
    }

    #[test]
    fn test_get_and_remove() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.insert(&record(1, "Home", "x")).unwrap();

        assert_eq!(backend.get(AddressId::new(1)).unwrap().unwrap().label(), "Home");
        assert!(backend.remove(AddressId::new(1)).unwrap());
        assert!(!backend.remove(AddressId::new(1)).unwrap());
        assert!(backend.get(AddressId::new(1)).unwrap().is_none());
        assert_eq!(backend.issued_ids().unwrap(), 1);
    }

    #[test]
    fn test_duplicate_id_is_rejected_atomically() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.insert(&record(1, "Home", "x")).unwrap();

        let err = backend.insert(&record(1, "Other", "y")).unwrap_err();
        assert!(matches!(err, StorageError::Database(_)));

        let records = backend.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label(), "Home");
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("waypost.db");

        {
            let mut backend = SqliteBackend::open(&path).unwrap();
            backend.insert(&record(1, "Home", "Lat: 12.34, Lng: 56.78")).unwrap();
            backend.insert(&record(2, "Office", "x")).unwrap();
            backend.remove(AddressId::new(2)).unwrap();
        }

        let backend = SqliteBackend::open(&path).unwrap();
        let records = backend.load_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].details(), "Lat: 12.34, Lng: 56.78");
        assert_eq!(backend.issued_ids().unwrap(), 2);
    }

    #[test]
    fn test_newer_schema_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("waypost.db");

        {
            let backend = SqliteBackend::open(&path).unwrap();
            backend
                .conn
                .execute(
                    "UPDATE schema_info SET value = ? WHERE key = 'version'",
                    [(SCHEMA_VERSION + 1).to_string()],
                )
                .unwrap();
        }

        let err = SqliteBackend::open(&path).err().unwrap();
        assert!(matches!(err, StorageError::UnsupportedSchema { .. }));
    }
}
