// Signet — Encryption Strategies
//
// Symmetric encryption of private-key material under a secret derived from
// a credential. Strategies are a closed tagged union dispatched by
// EncryptionMethod, so adding one is an exhaustive-match change rather than
// a new subclass. Every blob is self-describing: the nonce and (for
// password records) the per-record salt are embedded, and decryption needs
// nothing beyond the blob and the credential.
//
// Blob layouts:
//   Password               nonce(24) ‖ salt(16) ‖ ciphertext+tag
//   PlatformAuthenticator  iv(24) ‖ ciphertext+tag
//   None                   plaintext (identity transform)

use argon2::{Algorithm, Argon2, Params, Version};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use hkdf::Hkdf;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroizing;

use super::error::VaultError;

pub const KEY_LEN: usize = 32;
pub const NONCE_LEN: usize = 24;
pub const SALT_LEN: usize = 16;
pub const TAG_LEN: usize = 16;

// Argon2id parameters: m=65536 (64 MiB), t=3 iterations, p=4 lanes.
const ARGON2_M_COST: u32 = 65536;
const ARGON2_T_COST: u32 = 3;
const ARGON2_P_COST: u32 = 4;

/// HKDF context string binding authenticator-derived keys to this use.
const AUTHENTICATOR_HKDF_INFO: &[u8] = b"signet.record-encryption.v1";

/// How a key record is protected at rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncryptionMethod {
    /// Identity transform: explicit "no protection" mode.
    None,
    /// Key derived from a user password via Argon2id.
    Password,
    /// Key derived from platform-authenticator material via HKDF-SHA256.
    PlatformAuthenticator,
}

/// Secret material for one encryption method. Carried transiently by
/// callers; never persisted.
pub enum Credentials {
    None,
    Password(Zeroizing<String>),
    PlatformAuthenticator {
        input_key_material: Zeroizing<Vec<u8>>,
        device_id: String,
        credential_ref: String,
    },
}

impl Credentials {
    pub fn password(password: impl Into<String>) -> Self {
        Self::Password(Zeroizing::new(password.into()))
    }

    pub fn authenticator(
        input_key_material: Vec<u8>,
        device_id: impl Into<String>,
        credential_ref: impl Into<String>,
    ) -> Self {
        Self::PlatformAuthenticator {
            input_key_material: Zeroizing::new(input_key_material),
            device_id: device_id.into(),
            credential_ref: credential_ref.into(),
        }
    }

    pub fn method(&self) -> EncryptionMethod {
        match self {
            Self::None => EncryptionMethod::None,
            Self::Password(_) => EncryptionMethod::Password,
            Self::PlatformAuthenticator { .. } => EncryptionMethod::PlatformAuthenticator,
        }
    }

    /// Opaque reference recorded alongside the encrypted blob, linking it
    /// to the credential that can open it.
    pub fn encryption_ref(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::Password(_) => super::vault::CREDENTIAL_TAG_KEY.to_string(),
            Self::PlatformAuthenticator { credential_ref, .. } => credential_ref.clone(),
        }
    }
}

/// Custom Debug that NEVER reveals secret material.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("Credentials::None"),
            Self::Password(_) => f.write_str("Credentials::Password([REDACTED])"),
            Self::PlatformAuthenticator { device_id, credential_ref, .. } => f
                .debug_struct("Credentials::PlatformAuthenticator")
                .field("input_key_material", &"[REDACTED]")
                .field("device_id", device_id)
                .field("credential_ref", credential_ref)
                .finish(),
        }
    }
}

// ─── Encrypt / Decrypt ───────────────────────────────────────────────────────

/// Encrypt `plaintext` under the supplied credentials. Output is
/// self-describing per the layouts above.
pub fn encrypt(credentials: &Credentials, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
    match credentials {
        Credentials::None => Ok(plaintext.to_vec()),

        Credentials::Password(password) => {
            let salt = generate_salt();
            let key = derive_password_key(password.as_bytes(), &salt)?;
            let nonce = generate_nonce();
            let ciphertext = seal(&key, &nonce, plaintext)?;

            let mut blob = Vec::with_capacity(NONCE_LEN + SALT_LEN + ciphertext.len());
            blob.extend_from_slice(&nonce);
            blob.extend_from_slice(&salt);
            blob.extend_from_slice(&ciphertext);
            Ok(blob)
        }

        Credentials::PlatformAuthenticator {
            input_key_material,
            device_id,
            ..
        } => {
            let key = derive_authenticator_key(input_key_material, device_id)?;
            let iv = generate_nonce();
            let ciphertext = seal(&key, &iv, plaintext)?;

            let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
            blob.extend_from_slice(&iv);
            blob.extend_from_slice(&ciphertext);
            Ok(blob)
        }
    }
}

/// Decrypt a blob produced by [`encrypt`]. A wrong credential, a tampered
/// ciphertext, and a truncated buffer all surface as the same
/// [`VaultError::Decryption`].
pub fn decrypt(
    credentials: &Credentials,
    blob: &[u8],
) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    match credentials {
        Credentials::None => Ok(Zeroizing::new(blob.to_vec())),

        Credentials::Password(password) => {
            if blob.len() < NONCE_LEN + SALT_LEN + TAG_LEN {
                return Err(VaultError::Decryption);
            }

            let nonce: [u8; NONCE_LEN] = blob[..NONCE_LEN]
                .try_into()
                .map_err(|_| VaultError::Decryption)?;
            let salt = &blob[NONCE_LEN..NONCE_LEN + SALT_LEN];
            let ciphertext = &blob[NONCE_LEN + SALT_LEN..];

            let key = derive_password_key(password.as_bytes(), salt)?;
            open(&key, &nonce, ciphertext)
        }

        Credentials::PlatformAuthenticator {
            input_key_material,
            device_id,
            ..
        } => {
            if blob.len() < NONCE_LEN + TAG_LEN {
                return Err(VaultError::Decryption);
            }

            let iv: [u8; NONCE_LEN] = blob[..NONCE_LEN]
                .try_into()
                .map_err(|_| VaultError::Decryption)?;
            let ciphertext = &blob[NONCE_LEN..];

            let key = derive_authenticator_key(input_key_material, device_id)?;
            open(&key, &iv, ciphertext)
        }
    }
}

// ─── Key Derivation ──────────────────────────────────────────────────────────

/// Argon2id(password, salt) → 256-bit key.
fn derive_password_key(
    password: &[u8],
    salt: &[u8],
) -> Result<Zeroizing<[u8; KEY_LEN]>, VaultError> {
    let params = Params::new(ARGON2_M_COST, ARGON2_T_COST, ARGON2_P_COST, Some(KEY_LEN))
        .map_err(|e| VaultError::KeyDerivation(format!("invalid Argon2 params: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, key.as_mut_slice())
        .map_err(|e| VaultError::KeyDerivation(format!("Argon2id hash failed: {}", e)))?;

    Ok(key)
}

/// HKDF-SHA256(ikm, info = device id) → 256-bit key. The authenticator
/// material is already high-entropy, so no memory-hard stretching is
/// needed; the device id binds the key to this installation.
fn derive_authenticator_key(
    input_key_material: &[u8],
    device_id: &str,
) -> Result<Zeroizing<[u8; KEY_LEN]>, VaultError> {
    let hk = Hkdf::<Sha256>::new(Some(device_id.as_bytes()), input_key_material);

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    hk.expand(AUTHENTICATOR_HKDF_INFO, key.as_mut_slice())
        .map_err(|e| VaultError::KeyDerivation(format!("HKDF expansion failed: {}", e)))?;

    Ok(key)
}

// ─── AEAD Primitives ─────────────────────────────────────────────────────────

fn seal(
    key: &Zeroizing<[u8; KEY_LEN]>,
    nonce: &[u8; NONCE_LEN],
    plaintext: &[u8],
) -> Result<Vec<u8>, VaultError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key.as_slice())
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    cipher
        .encrypt(XNonce::from_slice(nonce), plaintext)
        .map_err(|e| VaultError::Encryption(e.to_string()))
}

fn open(
    key: &Zeroizing<[u8; KEY_LEN]>,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key.as_slice())
        .map_err(|_| VaultError::Decryption)?;

    cipher
        .decrypt(XNonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::Decryption)
}

fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    salt
}

fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    nonce
}

// ─── Tests ───────────────────────────────────────────────────────────────────
