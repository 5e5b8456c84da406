// Signet — Storage Collaborator
//
// Key-value persistence abstraction over the host extension's storage area.
// The host storage is JSON-shaped, eventually consistent across contexts,
// and NOT transactional across keys: callers get last-write-wins semantics
// per key and nothing more. Components built on top (key records, event
// queue, window registry) are written as idempotent upserts so that weak
// consistency model is sufficient.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Abstraction over the host platform's key-value storage area.
///
/// Multi-key operations are not atomic: a `set` of N records is N
/// independent writes, and concurrent writers to the same key resolve
/// last-writer-wins. Bulk flows that need all-or-nothing behavior must
/// get it from the backing store (e.g. [`SqliteStorage`]'s single-file
/// durability), not from this interface.
///
/// [`SqliteStorage`]: crate::platform::SqliteStorage
#[async_trait]
pub trait StorageArea: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Store `value` under `key`, replacing any existing value.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Remove every listed key. Missing keys are ignored.
    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;

    /// Snapshot of all stored key-value pairs.
    async fn get_all(&self) -> Result<HashMap<String, Value>, StorageError>;
}

/// In-memory [`StorageArea`] used by tests and short-lived page contexts.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl StorageArea for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    async fn get_all(&self) -> Result<HashMap<String, Value>, StorageError> {
        Ok(self.entries().clone())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_get_missing_key_returns_none() {
        let storage = MemoryStorage::new();
        assert!(storage.get("absent").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let storage = MemoryStorage::new();
        storage.set("k", json!({"a": 1})).await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_set_replaces_existing_value() {
        let storage = MemoryStorage::new();
        storage.set("k", json!(1)).await.unwrap();
        storage.set("k", json!(2)).await.unwrap();
        assert_eq!(storage.get("k").await.unwrap(), Some(json!(2)));
        assert_eq!(storage.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_is_tolerant_of_missing_keys() {
        let storage = MemoryStorage::new();
        storage.set("a", json!(1)).await.unwrap();
        storage.remove(&["a", "never-existed"]).await.unwrap();
        assert!(storage.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_all_snapshots_every_entry() {
        let storage = MemoryStorage::new();
        storage.set("a", json!(1)).await.unwrap();
        storage.set("b", json!(2)).await.unwrap();

        let all = storage.get_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a"], json!(1));
        assert_eq!(all["b"], json!(2));
    }
}
