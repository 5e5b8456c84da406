// Signet — Signing Collaborator
//
// The vault never signs anything itself: raw private-key bytes are handed
// to this collaborator transiently, for the duration of one call, and the
// caller drops them immediately after. Payloads are opaque signable bytes;
// their chain-specific structure is not this crate's concern.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignerError {
    #[error("signing failed: {0}")]
    Signing(String),

    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

/// Produces a signature (or signed envelope) over an opaque payload.
pub trait Signer: Send + Sync {
    fn sign(&self, private_key: &[u8], payload: &[u8]) -> Result<Vec<u8>, SignerError>;
}

// ─── Deterministic Mock for Testing ──────────────────────────────────────────

#[cfg(test)]
pub mod mock {
    use super::*;
    use sha2::{Digest, Sha256};

    /// Deterministic stand-in signer: SHA-256 over `key ‖ payload`. Enough
    /// to assert that the right key met the right payload, without pulling
    /// a real signature scheme into the core's tests.
    pub struct MockSigner;

    impl Signer for MockSigner {
        fn sign(&self, private_key: &[u8], payload: &[u8]) -> Result<Vec<u8>, SignerError> {
            if private_key.is_empty() {
                return Err(SignerError::InvalidKey("empty private key".to_string()));
            }

            let mut hasher = Sha256::new();
            hasher.update(private_key);
            hasher.update(payload);
            Ok(hasher.finalize().to_vec())
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
