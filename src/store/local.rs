//! Durable local key-value store backed by SQLite
//!
//! One table, one JSON string per key. The lead ledger lives under
//! [`LEADS_KEY`]; [`COMPETITOR_DRAFTS_KEY`] is a staging slot for the UI
//! (plain get/put passthrough, not part of the cache contract).

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use crate::core::Result;

/// Key holding the JSON-serialized lead ledger array
pub const LEADS_KEY: &str = "leads";

/// Key holding the UI's competitor sidebar working entities
pub const COMPETITOR_DRAFTS_KEY: &str = "competitor_drafts";

pub struct LocalStore {
    conn: Mutex<Connection>,
}

impl LocalStore {
    /// Open or create the store at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        Self::init(conn)
    }

    /// In-memory store for tests
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_then_get_roundtrips() {
        let store = LocalStore::open_in_memory().unwrap();
        assert!(store.get(LEADS_KEY).unwrap().is_none());
        store.put(LEADS_KEY, "[]").unwrap();
        assert_eq!(store.get(LEADS_KEY).unwrap().as_deref(), Some("[]"));
        store.put(LEADS_KEY, r#"[{"id":"1"}]"#).unwrap();
        assert_eq!(
            store.get(LEADS_KEY).unwrap().as_deref(),
            Some(r#"[{"id":"1"}]"#)
        );
    }

    #[test]
    fn reopen_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.db");
        {
            let store = LocalStore::open(&path).unwrap();
            store.put("k", "v").unwrap();
        }
        let store = LocalStore::open(&path).unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
