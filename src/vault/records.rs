// Signet — Key Record Models and Store
//
// SECURITY: `encrypted_private_key` is ciphertext, but Debug output still
// redacts it. Blob layouts leak salt/nonce material and record length, and
// nothing in a log should invite correlating them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::error::VaultError;
use super::strategy::EncryptionMethod;
use crate::platform::StorageArea;

/// Storage key prefix for key records.
pub(crate) const KEY_RECORD_PREFIX: &str = "signet.keyrecord.";

/// Current on-disk record format: the encrypted payload is the private key
/// alone.
pub const CURRENT_FORMAT_VERSION: u32 = 1;

/// Legacy format: the encrypted payload is the full secret key, i.e. the
/// private and public key bytes concatenated.
pub const LEGACY_FORMAT_VERSION: u32 = 0;

/// One managed keypair: an encrypted private key plus the protection
/// metadata required to open it. The blob is only meaningful together with
/// `encryption_method` and `encryption_ref`, which is why the trio lives in
/// one record under one storage key.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyRecord {
    pub public_key: Vec<u8>,
    pub encrypted_private_key: Vec<u8>,
    pub encryption_method: EncryptionMethod,
    pub encryption_ref: String,
    pub format_version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KeyRecord {
    /// The storage key this record lives under.
    pub fn storage_key(&self) -> String {
        storage_key_for(&self.public_key)
    }
}

impl fmt::Debug for KeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyRecord")
            .field("public_key", &hex_encode(&self.public_key))
            .field("encrypted_private_key", &"[REDACTED]")
            .field("encryption_method", &self.encryption_method)
            .field("encryption_ref", &self.encryption_ref)
            .field("format_version", &self.format_version)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

pub(crate) fn storage_key_for(public_key: &[u8]) -> String {
    format!("{}{}", KEY_RECORD_PREFIX, hex_encode(public_key))
}

pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Keyed persistence of [`KeyRecord`]s over the storage collaborator.
/// Writes are per-record upserts; bulk operations are sequences of upserts
/// and inherit the storage layer's non-transactional semantics.
pub struct KeyRecordStore {
    storage: Arc<dyn StorageArea>,
}

impl KeyRecordStore {
    pub fn new(storage: Arc<dyn StorageArea>) -> Self {
        Self { storage }
    }

    pub async fn get(&self, public_key: &[u8]) -> Result<Option<KeyRecord>, VaultError> {
        let key = storage_key_for(public_key);
        match self.storage.get(&key).await? {
            Some(value) => Ok(Some(decode_record(&key, value)?)),
            None => Ok(None),
        }
    }

    pub async fn put(&self, record: &KeyRecord) -> Result<(), VaultError> {
        let value = serde_json::to_value(record)
            .map_err(|e| VaultError::Malformed(e.to_string()))?;
        self.storage.set(&record.storage_key(), value).await?;

        tracing::debug!(
            public_key = %hex_encode(&record.public_key),
            method = ?record.encryption_method,
            version = record.format_version,
            "key record persisted"
        );
        Ok(())
    }

    pub async fn put_many(&self, records: &[KeyRecord]) -> Result<(), VaultError> {
        for record in records {
            self.put(record).await?;
        }
        Ok(())
    }

    pub async fn remove(&self, public_key: &[u8]) -> Result<(), VaultError> {
        let key = storage_key_for(public_key);
        self.storage.remove(&[key.as_str()]).await?;
        Ok(())
    }

    pub async fn all(&self) -> Result<Vec<KeyRecord>, VaultError> {
        let mut records = Vec::new();
        for (key, value) in self.storage.get_all().await? {
            if key.starts_with(KEY_RECORD_PREFIX) {
                records.push(decode_record(&key, value)?);
            }
        }
        Ok(records)
    }

    /// Remove every key record (full reset). Other namespaces are untouched.
    pub async fn clear(&self) -> Result<(), VaultError> {
        let keys: Vec<String> = self
            .storage
            .get_all()
            .await?
            .into_keys()
            .filter(|k| k.starts_with(KEY_RECORD_PREFIX))
            .collect();

        let refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        self.storage.remove(&refs).await?;

        tracing::info!(count = refs.len(), "all key records removed");
        Ok(())
    }
}

fn decode_record(key: &str, value: Value) -> Result<KeyRecord, VaultError> {
    serde_json::from_value(value)
        .map_err(|e| VaultError::Malformed(format!("key record {}: {}", key, e)))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
