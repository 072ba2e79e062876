use std::path::Path;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use tracing::{info, warn};

use crate::kv::KvStore;
use crate::migrations;

/// Key-value store persisted in a single SQLite table.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

impl KvStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self.with_conn(|conn| {
            Ok(conn
                .query_row("SELECT value FROM kv_store WHERE key = ?1", [key], |row| {
                    row.get(0)
                })
                .optional()?)
        })?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                (key, text.as_str()),
            )?;
            Ok(())
        })
    }

    fn insert_if_absent(&self, key: &str, value: &Value) -> Result<bool> {
        let text = serde_json::to_string(value)?;
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO kv_store (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO NOTHING",
                (key, text.as_str()),
            )?;
            Ok(inserted == 1)
        })
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM kv_store WHERE key = ?1", [key])?;
            Ok(())
        })
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<Value>> {
        // substr/length count characters, so this is an exact literal prefix
        // match (unlike LIKE, which would treat `_` and `%` as wildcards).
        let rows: Vec<(String, String)> = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key, value FROM kv_store
                 WHERE substr(key, 1, length(?1)) = ?1
                 ORDER BY key",
            )?;
            let rows = stmt
                .query_map([prefix], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;

        Ok(rows
            .into_iter()
            .filter_map(|(key, text)| match serde_json::from_str(&text) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Corrupt value under key '{}': {}", key, e);
                    None
                }
            })
            .collect())
    }
}
