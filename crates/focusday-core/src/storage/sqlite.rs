//! SQLite-backed key-value storage.
//!
//! A single `kv` table holds both persisted entries. The database file
//! lives at `~/.config/focusday/focusday.db`.

use std::path::Path;
use std::rc::Rc;

use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, KvStore, StorageError};

/// SQLite key-value store.
///
/// Cloning shares the underlying connection; the core is single-threaded
/// so no locking is involved.
#[derive(Clone)]
pub struct SqliteKv {
    conn: Rc<Connection>,
}

impl SqliteKv {
    /// Open the database at `~/.config/focusday/focusday.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        let path = data_dir()?.join("focusday.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path).map_err(|err| StorageError::OpenFailed {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let kv = Self {
            conn: Rc::new(conn),
        };
        kv.migrate()?;
        Ok(kv)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|err| StorageError::ReadFailed(err.to_string()))?;
        let kv = Self {
            conn: Rc::new(conn),
        };
        kv.migrate()?;
        Ok(kv)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    key   TEXT PRIMARY KEY,
                    value TEXT NOT NULL
                );",
            )
            .map_err(|err| StorageError::WriteFailed(err.to_string()))
    }
}

impl KvStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StorageError::ReadFailed(err.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn
            .execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map(|_| ())
            .map_err(write_error)
    }
}

fn write_error(err: rusqlite::Error) -> StorageError {
    match &err {
        rusqlite::Error::SqliteFailure(code, _msg)
            if code.code == rusqlite::ErrorCode::DiskFull
                || code.code == rusqlite::ErrorCode::TooBig =>
        {
            StorageError::QuotaExceeded
        }
        _ => StorageError::WriteFailed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_roundtrip() {
        let kv = SqliteKv::open_memory().unwrap();
        assert!(kv.get("state").unwrap().is_none());
        kv.set("state", "{\"a\":1}").unwrap();
        assert_eq!(kv.get("state").unwrap().as_deref(), Some("{\"a\":1}"));
    }

    #[test]
    fn set_overwrites_existing_value() {
        let kv = SqliteKv::open_memory().unwrap();
        kv.set("state", "one").unwrap();
        kv.set("state", "two").unwrap();
        assert_eq!(kv.get("state").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn keys_are_independent() {
        let kv = SqliteKv::open_memory().unwrap();
        kv.set("state", "s").unwrap();
        kv.set("analytics", "a").unwrap();
        assert_eq!(kv.get("state").unwrap().as_deref(), Some("s"));
        assert_eq!(kv.get("analytics").unwrap().as_deref(), Some("a"));
    }

    #[test]
    fn clones_share_the_backend() {
        let kv = SqliteKv::open_memory().unwrap();
        let other = kv.clone();
        kv.set("state", "shared").unwrap();
        assert_eq!(other.get("state").unwrap().as_deref(), Some("shared"));
    }

    #[test]
    fn survives_reopen_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("focusday.db");
        {
            let kv = SqliteKv::open_at(&path).unwrap();
            kv.set("state", "persisted").unwrap();
        }
        let kv = SqliteKv::open_at(&path).unwrap();
        assert_eq!(kv.get("state").unwrap().as_deref(), Some("persisted"));
    }
}
