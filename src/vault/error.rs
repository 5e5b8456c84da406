// Signet — Vault error types

use thiserror::Error;

use super::strategy::EncryptionMethod;
use crate::platform::StorageError;

#[derive(Debug, Error)]
pub enum VaultError {
    /// Authenticated decryption failed: wrong credential, tampered blob, or
    /// a structurally invalid buffer. Deliberately undifferentiated so the
    /// error is never an oracle.
    #[error("decryption failed")]
    Decryption,

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("credential method mismatch: record uses {record:?}, caller supplied {supplied:?}")]
    InvalidCredentialMethod {
        record: EncryptionMethod,
        supplied: EncryptionMethod,
    },

    #[error("no key record for public key {0}")]
    NotFound(String),

    #[error("malformed stored data: {0}")]
    Malformed(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
