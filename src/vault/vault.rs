// Signet — Credential Vault
//
// Orchestrates encryption strategies and the key record store. Key design
// decisions:
//   - Version migration is lazy and read-triggered: a legacy record is
//     normalized the first time it is decrypted, never in a big-bang pass.
//   - Bulk re-encryption decrypts everything under the old credential
//     BEFORE encrypting anything under the new one, and persists last, so
//     a mid-flight failure cannot leave a mixed store.
//   - Raw private-key bytes leave this module only as `Zeroizing` buffers
//     handed transiently to the signing collaborator.

use std::sync::Arc;

use chrono::Utc;
use zeroize::Zeroizing;

use super::error::VaultError;
use super::records::{
    hex_encode, KeyRecord, KeyRecordStore, CURRENT_FORMAT_VERSION, LEGACY_FORMAT_VERSION,
};
use super::strategy::{self, Credentials};
use crate::platform::StorageArea;

/// Storage key of the credential tag, the canary used by
/// [`CredentialVault::verify_password`].
pub const CREDENTIAL_TAG_KEY: &str = "signet.credential_tag";

/// Known plaintext encrypted into the credential tag.
const CREDENTIAL_TAG_PLAINTEXT: &[u8] = b"signet.credential-tag.v1";

pub struct CredentialVault {
    storage: Arc<dyn StorageArea>,
    records: KeyRecordStore,
}

impl CredentialVault {
    pub fn new(storage: Arc<dyn StorageArea>) -> Self {
        Self {
            records: KeyRecordStore::new(storage.clone()),
            storage,
        }
    }

    // ─── Decryption ──────────────────────────────────────────────────────────

    /// Decrypt the private key stored for `public_key`.
    ///
    /// The supplied credentials must use the same method the record was
    /// encrypted with. Legacy records (private ‖ public concatenation) are
    /// split down to the private key and migrated in place on this first
    /// read; a failure to persist the migrated record does not fail the
    /// read itself.
    pub async fn get_decrypted(
        &self,
        public_key: &[u8],
        credentials: &Credentials,
    ) -> Result<Zeroizing<Vec<u8>>, VaultError> {
        let record = self
            .records
            .get(public_key)
            .await?
            .ok_or_else(|| VaultError::NotFound(hex_encode(public_key)))?;

        if record.encryption_method != credentials.method() {
            return Err(VaultError::InvalidCredentialMethod {
                record: record.encryption_method,
                supplied: credentials.method(),
            });
        }

        let plaintext = strategy::decrypt(credentials, &record.encrypted_private_key)?;

        if record.format_version != LEGACY_FORMAT_VERSION {
            return Ok(plaintext);
        }

        let private_key = split_legacy_secret_key(&plaintext, public_key)?;

        let migrated = KeyRecord {
            encrypted_private_key: strategy::encrypt(credentials, &private_key)?,
            format_version: CURRENT_FORMAT_VERSION,
            updated_at: Utc::now(),
            ..record
        };
        if let Err(e) = self.records.put(&migrated).await {
            tracing::warn!(
                public_key = %hex_encode(public_key),
                error = %e,
                "legacy record migration could not be persisted; will retry on next read"
            );
        } else {
            tracing::info!(
                public_key = %hex_encode(public_key),
                "legacy key record migrated to current format"
            );
        }

        Ok(private_key)
    }

    // ─── Re-encryption ───────────────────────────────────────────────────────

    /// Re-encrypt one record under a different credential or method.
    ///
    /// This is the only path that changes a record's protection method.
    /// The record is decrypted, normalized to the current format, and
    /// re-encrypted; persisting the replacement is the last step, so a
    /// failure anywhere leaves the stored record untouched.
    pub async fn upgrade(
        &self,
        public_key: &[u8],
        current: &Credentials,
        target: &Credentials,
    ) -> Result<KeyRecord, VaultError> {
        let record = self
            .records
            .get(public_key)
            .await?
            .ok_or_else(|| VaultError::NotFound(hex_encode(public_key)))?;

        if record.encryption_method != current.method() {
            return Err(VaultError::InvalidCredentialMethod {
                record: record.encryption_method,
                supplied: current.method(),
            });
        }

        let plaintext = strategy::decrypt(current, &record.encrypted_private_key)?;
        let private_key = if record.format_version == LEGACY_FORMAT_VERSION {
            split_legacy_secret_key(&plaintext, public_key)?
        } else {
            plaintext
        };

        let upgraded = KeyRecord {
            encrypted_private_key: strategy::encrypt(target, &private_key)?,
            encryption_method: target.method(),
            encryption_ref: target.encryption_ref(),
            format_version: CURRENT_FORMAT_VERSION,
            updated_at: Utc::now(),
            ..record
        };
        self.records.put(&upgraded).await?;

        tracing::info!(
            public_key = %hex_encode(public_key),
            method = ?upgraded.encryption_method,
            "key record re-encrypted"
        );
        Ok(upgraded)
    }

    /// Change the vault password: every password-protected record is
    /// decrypted under the old password first, then re-encrypted under the
    /// new one, then persisted, and finally the credential tag is replaced.
    /// Returns the number of re-encrypted records.
    pub async fn rotate_password(&self, old: &str, new: &str) -> Result<usize, VaultError> {
        if !self.verify_password(old).await? {
            return Err(VaultError::Decryption);
        }

        let old_credentials = Credentials::password(old);
        let new_credentials = Credentials::password(new);

        let password_records: Vec<KeyRecord> = self
            .records
            .all()
            .await?
            .into_iter()
            .filter(|r| r.encryption_method == old_credentials.method())
            .collect();

        // Phase 1: decrypt everything before touching anything.
        let mut decrypted: Vec<(KeyRecord, Zeroizing<Vec<u8>>)> = Vec::new();
        for record in password_records {
            let plaintext = strategy::decrypt(&old_credentials, &record.encrypted_private_key)?;
            let private_key = if record.format_version == LEGACY_FORMAT_VERSION {
                split_legacy_secret_key(&plaintext, &record.public_key)?
            } else {
                plaintext
            };
            decrypted.push((record, private_key));
        }

        // Phase 2: re-encrypt, then persist as the final step.
        let now = Utc::now();
        let mut reencrypted = Vec::with_capacity(decrypted.len());
        for (record, private_key) in &decrypted {
            reencrypted.push(KeyRecord {
                encrypted_private_key: strategy::encrypt(&new_credentials, private_key)?,
                encryption_ref: new_credentials.encryption_ref(),
                format_version: CURRENT_FORMAT_VERSION,
                updated_at: now,
                ..record.clone()
            });
        }

        self.records.put_many(&reencrypted).await?;
        self.set_credential_tag(new).await?;

        tracing::info!(count = reencrypted.len(), "vault password rotated");
        Ok(reencrypted.len())
    }

    // ─── Password Verification ───────────────────────────────────────────────

    /// Check a candidate password against the credential tag, without ever
    /// touching real key material.
    pub async fn verify_password(&self, candidate: &str) -> Result<bool, VaultError> {
        let value = self
            .storage
            .get(CREDENTIAL_TAG_KEY)
            .await?
            .ok_or_else(|| VaultError::NotFound("credential tag".to_string()))?;

        let blob: Vec<u8> = serde_json::from_value(value)
            .map_err(|e| VaultError::Malformed(format!("credential tag: {}", e)))?;

        match strategy::decrypt(&Credentials::password(candidate), &blob) {
            Ok(plaintext) => Ok(plaintext.as_slice() == CREDENTIAL_TAG_PLAINTEXT),
            Err(VaultError::Decryption) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Write (or replace) the credential tag for `password`. Called on
    /// installation setup and at the end of a password rotation.
    pub async fn set_credential_tag(&self, password: &str) -> Result<(), VaultError> {
        let blob = strategy::encrypt(&Credentials::password(password), CREDENTIAL_TAG_PLAINTEXT)?;
        let value =
            serde_json::to_value(blob).map_err(|e| VaultError::Malformed(e.to_string()))?;
        self.storage.set(CREDENTIAL_TAG_KEY, value).await?;
        Ok(())
    }

    // ─── Record Lifecycle ────────────────────────────────────────────────────

    /// Encrypt and persist a new record for a generated or imported
    /// keypair. The private key is stored alone, at the current format.
    pub async fn create_record(
        &self,
        public_key: &[u8],
        private_key: &[u8],
        credentials: &Credentials,
    ) -> Result<KeyRecord, VaultError> {
        let now = Utc::now();
        let record = KeyRecord {
            public_key: public_key.to_vec(),
            encrypted_private_key: strategy::encrypt(credentials, private_key)?,
            encryption_method: credentials.method(),
            encryption_ref: credentials.encryption_ref(),
            format_version: CURRENT_FORMAT_VERSION,
            created_at: now,
            updated_at: now,
        };
        self.records.put(&record).await?;
        Ok(record)
    }

    /// Persist a batch of records (bulk re-encryption flows). The storage
    /// collaborator is expected to commit the whole batch or none; see the
    /// [`StorageArea`] contract.
    pub async fn save_many(&self, records: &[KeyRecord]) -> Result<(), VaultError> {
        self.records.put_many(records).await
    }

    pub async fn remove(&self, public_key: &[u8]) -> Result<(), VaultError> {
        self.records.remove(public_key).await
    }

    /// Remove every key record (account deletion / full reset).
    pub async fn remove_all(&self) -> Result<(), VaultError> {
        self.records.clear().await
    }

    pub async fn list_public_keys(&self) -> Result<Vec<Vec<u8>>, VaultError> {
        Ok(self
            .records
            .all()
            .await?
            .into_iter()
            .map(|r| r.public_key)
            .collect())
    }
}

/// Split a legacy `private ‖ public` secret key down to the private part.
fn split_legacy_secret_key(
    plaintext: &[u8],
    public_key: &[u8],
) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    if plaintext.len() <= public_key.len() {
        return Err(VaultError::Malformed(
            "legacy secret key is not longer than the public key".to_string(),
        ));
    }

    let split = plaintext.len() - public_key.len();
    if &plaintext[split..] != public_key {
        return Err(VaultError::Malformed(
            "legacy secret key does not end with the record's public key".to_string(),
        ));
    }

    Ok(Zeroizing::new(plaintext[..split].to_vec()))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
