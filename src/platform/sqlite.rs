// Signet — Durable Storage Backend
//
// SQLite-backed implementation of the storage collaborator for the
// privileged context. A single keyed blob table with upsert semantics is
// enough: record atomicity in this system is per key, and every component
// above this layer treats writes as idempotent upserts.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::Value;

use super::storage::{StorageArea, StorageError};

/// Durable [`StorageArea`] over a local SQLite database.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.run_migrations()?;
        Ok(storage)
    }

    /// Open an in-memory database (tests and throwaway contexts).
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let storage = Self {
            conn: Mutex::new(conn),
        };
        storage.run_migrations()?;
        Ok(storage)
    }

    /// Default database location: `<user data dir>/signet/signet.db`.
    pub fn default_path() -> PathBuf {
        let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("signet").join("signet.db")
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn run_migrations(&self) -> Result<(), StorageError> {
        self.conn().execute_batch(
            "
            CREATE TABLE IF NOT EXISTS kv (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            );
            ",
        )?;

        tracing::debug!("storage migrations completed");
        Ok(())
    }
}

#[async_trait]
impl StorageArea for SqliteStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let mut rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;

        match rows.next() {
            Some(raw) => Ok(Some(serde_json::from_str(&raw?)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&value)?;
        self.conn().execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = ?2",
            params![key, raw],
        )?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("DELETE FROM kv WHERE key = ?1")?;
        for key in keys {
            stmt.execute(params![key])?;
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<HashMap<String, Value>, StorageError> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT key, value FROM kv")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut all = HashMap::new();
        for row in rows {
            let (key, raw) = row?;
            all.insert(key, serde_json::from_str(&raw)?);
        }
        Ok(all)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.set("k", json!({"x": [1, 2, 3]})).await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some(json!({"x": [1, 2, 3]})));
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.set("k", json!("old")).await.unwrap();
        storage.set("k", json!("new")).await.unwrap();

        assert_eq!(storage.get("k").await.unwrap(), Some(json!("new")));
        assert_eq!(storage.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_multiple_keys() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        storage.set("a", json!(1)).await.unwrap();
        storage.set("b", json!(2)).await.unwrap();
        storage.set("c", json!(3)).await.unwrap();

        storage.remove(&["a", "c", "missing"]).await.unwrap();

        let all = storage.get_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all.contains_key("b"));
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signet.db");

        {
            let storage = SqliteStorage::open(&path).unwrap();
            storage.set("persisted", json!({"id": "r1"})).await.unwrap();
        }

        let reopened = SqliteStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get("persisted").await.unwrap(),
            Some(json!({"id": "r1"})),
            "values must survive a full process restart"
        );
    }

    #[test]
    fn test_default_path_is_namespaced() {
        let path = SqliteStorage::default_path();
        assert!(path.to_string_lossy().contains("signet"));
        assert!(path.to_string_lossy().ends_with("signet.db"));
    }
}
