// Signet — Platform Authenticator Collaborator
//
// Produces input key material for the authenticator-derived encryption
// strategy. Each enrollment stores a random 256-bit secret under an opaque
// credential reference; a later assertion releases the same material after
// the platform's user-presence ceremony. The ceremony itself belongs to the
// host platform and is out of scope here.

use async_trait::async_trait;
use rand::RngCore;
use thiserror::Error;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Byte length of generated input key material (256-bit entropy).
const IKM_LEN: usize = 32;

/// Service name identifying Signet entries in the platform keyring.
const KEYRING_SERVICE: &str = "signet-wallet-core";

#[derive(Debug, Error)]
pub enum AuthenticatorError {
    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("authenticator ceremony failed: {0}")]
    Ceremony(String),

    #[error("unknown authenticator credential: {0}")]
    UnknownCredential(String),
}

/// Result of an enrollment ceremony: the stored credential descriptor and
/// the input key material it releases.
pub struct AuthenticatorEnrollment {
    /// Opaque reference persisted in key records as `encryption_ref`.
    pub credential_ref: String,
    /// High-entropy secret fed into the key-derivation step.
    pub input_key_material: Zeroizing<Vec<u8>>,
}

/// Abstraction over the platform authenticator, enabling platform-specific
/// backends and mock implementations for testing.
#[async_trait]
pub trait PlatformAuthenticator: Send + Sync {
    /// Run an enrollment ceremony, creating a new stored credential.
    async fn enroll(&self) -> Result<AuthenticatorEnrollment, AuthenticatorError>;

    /// Run an assertion ceremony for an existing credential, releasing its
    /// input key material.
    async fn get_assertion(
        &self,
        credential_ref: &str,
    ) -> Result<Zeroizing<Vec<u8>>, AuthenticatorError>;

    /// Remove a stored credential. Unknown references are not an error.
    async fn revoke(&self, credential_ref: &str) -> Result<(), AuthenticatorError>;
}

// ─── Platform Implementation ─────────────────────────────────────────────────

/// Production implementation backed by the OS keyring.
/// Dispatches to:
///   - Linux: D-Bus Secret Service (GNOME Keyring / KDE Wallet)
///   - macOS: Security.framework Keychain
///   - Windows: Windows Credential Manager
pub struct KeyringAuthenticator {
    service: String,
}

impl KeyringAuthenticator {
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
        }
    }

    /// Creates an authenticator with a custom service name (test isolation).
    #[allow(dead_code)]
    pub fn with_service(service: &str) -> Self {
        Self {
            service: service.to_string(),
        }
    }

    fn entry(&self, credential_ref: &str) -> Result<keyring::Entry, AuthenticatorError> {
        keyring::Entry::new(&self.service, credential_ref)
            .map_err(|e| AuthenticatorError::Keyring(format!("failed to create entry: {}", e)))
    }

    fn generate_ikm() -> Zeroizing<Vec<u8>> {
        let mut ikm = Zeroizing::new(vec![0u8; IKM_LEN]);
        rand::rngs::OsRng.fill_bytes(&mut ikm);
        ikm
    }
}

impl Default for KeyringAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformAuthenticator for KeyringAuthenticator {
    async fn enroll(&self) -> Result<AuthenticatorEnrollment, AuthenticatorError> {
        let credential_ref = Uuid::new_v4().to_string();
        let ikm = Self::generate_ikm();

        let entry = self.entry(&credential_ref)?;
        entry.set_secret(&ikm).map_err(|e| {
            AuthenticatorError::Keyring(format!("failed to store credential material: {}", e))
        })?;

        tracing::info!(%credential_ref, "enrolled new authenticator credential");
        Ok(AuthenticatorEnrollment {
            credential_ref,
            input_key_material: ikm,
        })
    }

    async fn get_assertion(
        &self,
        credential_ref: &str,
    ) -> Result<Zeroizing<Vec<u8>>, AuthenticatorError> {
        let entry = self.entry(credential_ref)?;
        match entry.get_secret() {
            Ok(secret) => Ok(Zeroizing::new(secret)),
            Err(keyring::Error::NoEntry) => Err(AuthenticatorError::UnknownCredential(
                credential_ref.to_string(),
            )),
            Err(e) => Err(AuthenticatorError::Keyring(format!(
                "failed to retrieve credential material: {}",
                e
            ))),
        }
    }

    async fn revoke(&self, credential_ref: &str) -> Result<(), AuthenticatorError> {
        let entry = self.entry(credential_ref)?;
        match entry.delete_credential() {
            Ok(()) => {
                tracing::warn!(%credential_ref, "authenticator credential revoked");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AuthenticatorError::Keyring(format!(
                "failed to delete credential material: {}",
                e
            ))),
        }
    }
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────


// ─── Tests ───────────────────────────────────────────────────────────────────
