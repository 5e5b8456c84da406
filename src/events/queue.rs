// Signet — Durable Event Queue
//
// The single source of truth for "what is this extension currently waiting
// to resolve". Host platforms may kill the privileged process between a
// request arriving and the human answering, so every entry lives in the
// durable storage collaborator, keyed by correlation id, and every write
// is an idempotent upsert.

use std::sync::Arc;

use thiserror::Error;

use super::models::{EventKind, PendingEvent};
use crate::platform::{StorageArea, StorageError};

const EVENT_PREFIX: &str = "signet.event.";

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("malformed stored event: {0}")]
    Malformed(String),
}

pub struct EventQueue {
    storage: Arc<dyn StorageArea>,
}

impl EventQueue {
    pub fn new(storage: Arc<dyn StorageArea>) -> Self {
        Self { storage }
    }

    /// Upsert by id: a second save with the same id replaces in place,
    /// never duplicates.
    pub async fn save_or_replace(&self, event: &PendingEvent) -> Result<(), QueueError> {
        let value = serde_json::to_value(event)
            .map_err(|e| QueueError::Malformed(e.to_string()))?;
        self.storage.set(&storage_key(&event.id), value).await?;

        tracing::debug!(id = %event.id, kind = ?event.payload.kind(), "pending event saved");
        Ok(())
    }

    pub async fn fetch_all(&self) -> Result<Vec<PendingEvent>, QueueError> {
        let mut events = Vec::new();
        for (key, value) in self.storage.get_all().await? {
            if key.starts_with(EVENT_PREFIX) {
                events.push(decode_event(&key, value)?);
            }
        }
        Ok(events)
    }

    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<PendingEvent>, QueueError> {
        let key = storage_key(id);
        match self.storage.get(&key).await? {
            Some(value) => Ok(Some(decode_event(&key, value)?)),
            None => Ok(None),
        }
    }

    pub async fn fetch_by_kind(&self, kind: EventKind) -> Result<Vec<PendingEvent>, QueueError> {
        Ok(self
            .fetch_all()
            .await?
            .into_iter()
            .filter(|e| e.payload.kind() == kind)
            .collect())
    }

    pub async fn remove_by_id(&self, id: &str) -> Result<(), QueueError> {
        let key = storage_key(id);
        self.storage.remove(&[key.as_str()]).await?;
        tracing::debug!(%id, "pending event removed");
        Ok(())
    }
}

fn storage_key(id: &str) -> String {
    format!("{}{}", EVENT_PREFIX, id)
}

fn decode_event(key: &str, value: serde_json::Value) -> Result<PendingEvent, QueueError> {
    serde_json::from_value(value)
        .map_err(|e| QueueError::Malformed(format!("event {}: {}", key, e)))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::models::EventPayload;
    use crate::gateway::protocol::ClientInfo;
    use crate::platform::MemoryStorage;

    fn client() -> ClientInfo {
        ClientInfo {
            origin: "https://dapp.example".to_string(),
            display_name: "Example Dapp".to_string(),
            icon_ref: None,
        }
    }

    fn sign_event(id: &str, payload_byte: u8) -> PendingEvent {
        PendingEvent {
            id: id.to_string(),
            origin: Some(1),
            payload: EventPayload::SignBytes {
                client: client(),
                payload: vec![payload_byte; 16],
                signer: vec![0xA0; 32],
            },
        }
    }

    fn queue() -> EventQueue {
        EventQueue::new(Arc::new(MemoryStorage::new()))
    }

    #[tokio::test]
    async fn test_save_then_fetch_by_id() {
        let queue = queue();
        let event = sign_event("r1", 0x01);

        queue.save_or_replace(&event).await.unwrap();
        assert_eq!(queue.fetch_by_id("r1").await.unwrap(), Some(event));
    }

    #[tokio::test]
    async fn test_identical_save_is_idempotent() {
        let queue = queue();
        let event = sign_event("r1", 0x01);

        queue.save_or_replace(&event).await.unwrap();
        queue.save_or_replace(&event).await.unwrap();

        assert_eq!(
            queue.fetch_all().await.unwrap().len(),
            1,
            "saving the same event twice must not duplicate it"
        );
    }

    #[tokio::test]
    async fn test_save_with_new_payload_replaces_in_place() {
        let queue = queue();
        queue.save_or_replace(&sign_event("r1", 0x01)).await.unwrap();
        queue.save_or_replace(&sign_event("r1", 0x02)).await.unwrap();

        let all = queue.fetch_all().await.unwrap();
        assert_eq!(all.len(), 1);
        match &all[0].payload {
            EventPayload::SignBytes { payload, .. } => assert_eq!(payload, &vec![0x02; 16]),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_by_kind_filters() {
        let queue = queue();
        queue.save_or_replace(&sign_event("r1", 0x01)).await.unwrap();
        queue
            .save_or_replace(&PendingEvent {
                id: "c1".to_string(),
                origin: Some(2),
                payload: EventPayload::Connect { client: client() },
            })
            .await
            .unwrap();

        let signs = queue.fetch_by_kind(EventKind::SignBytes).await.unwrap();
        assert_eq!(signs.len(), 1);
        assert_eq!(signs[0].id, "r1");

        assert!(queue
            .fetch_by_kind(EventKind::DeepLink)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_remove_by_id() {
        let queue = queue();
        queue.save_or_replace(&sign_event("r1", 0x01)).await.unwrap();
        queue.save_or_replace(&sign_event("r2", 0x02)).await.unwrap();

        queue.remove_by_id("r1").await.unwrap();

        assert!(queue.fetch_by_id("r1").await.unwrap().is_none());
        assert!(queue.fetch_by_id("r2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_missing_id_is_a_no_op() {
        let queue = queue();
        assert!(queue.remove_by_id("never-saved").await.is_ok());
    }

    #[tokio::test]
    async fn test_queue_survives_restart_of_the_privileged_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signet.db");

        {
            let storage = Arc::new(crate::platform::SqliteStorage::open(&path).unwrap());
            let queue = EventQueue::new(storage);
            queue.save_or_replace(&sign_event("r1", 0x01)).await.unwrap();
        }

        // A fresh process opens the same database and still sees the event.
        let storage = Arc::new(crate::platform::SqliteStorage::open(&path).unwrap());
        let queue = EventQueue::new(storage);
        assert!(queue.fetch_by_id("r1").await.unwrap().is_some());
    }
}
