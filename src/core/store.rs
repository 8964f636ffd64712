//! Persistent state store abstraction.
//!
//! The host grants the extension a per-user key/value store surviving across
//! activations. Only two logical keys exist: `installedVersion` and
//! `toolStats`. Both are opaque to the host; only this extension reads or
//! writes them.
//!
//! No cross-process coordination or locking exists: two host windows sharing
//! the same store are unguarded. That is an explicit non-goal of this design.

use crate::core::error::AlmanacError;
use rusqlite::{Connection, params};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Per-user key/value storage surviving across process activations.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, AlmanacError>;
    fn set(&self, key: &str, value: &str) -> Result<(), AlmanacError>;
    fn remove(&self, key: &str) -> Result<(), AlmanacError>;
}

pub fn state_db_path(storage_root: &Path) -> PathBuf {
    storage_root.join("state.db")
}

fn db_connect(db_path: &Path) -> Result<Connection, AlmanacError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(AlmanacError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(AlmanacError::RusqliteError)?;
    Ok(conn)
}

/// SQLite-backed state store under `<storage_root>/state.db`.
///
/// Each operation opens a short-lived connection; daemonless usage keeps
/// contention low and WAL plus a busy timeout covers the rest.
pub struct SqliteStateStore {
    db_path: PathBuf,
}

impl SqliteStateStore {
    pub fn open(storage_root: &Path) -> Result<Self, AlmanacError> {
        fs::create_dir_all(storage_root).map_err(AlmanacError::IoError)?;
        let db_path = state_db_path(storage_root);
        let conn = db_connect(&db_path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS state (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            [],
        )?;
        Ok(SqliteStateStore { db_path })
    }
}

impl StateStore for SqliteStateStore {
    fn get(&self, key: &str) -> Result<Option<String>, AlmanacError> {
        let conn = db_connect(&self.db_path)?;
        let mut stmt = conn.prepare("SELECT value FROM state WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AlmanacError> {
        let conn = db_connect(&self.db_path)?;
        conn.execute(
            "INSERT INTO state (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AlmanacError> {
        let conn = db_connect(&self.db_path)?;
        conn.execute("DELETE FROM state WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// In-memory state store for unit testing the core without a host runtime.
#[derive(Default)]
pub struct MemoryStateStore {
    map: Mutex<BTreeMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>, AlmanacError> {
        let map = self
            .map
            .lock()
            .map_err(|_| AlmanacError::ValidationError("state store poisoned".to_string()))?;
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AlmanacError> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| AlmanacError::ValidationError("state store poisoned".to_string()))?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AlmanacError> {
        let mut map = self
            .map
            .lock()
            .map_err(|_| AlmanacError::ValidationError("state store poisoned".to_string()))?;
        map.remove(key);
        Ok(())
    }
}
