// Signet — Vault Module
//
// Private keys encrypted at rest under interchangeable strategies, with a
// versioned record format and lazy migration. Key material is decrypted
// only transiently, for the duration of one signing call.

mod error;
mod records;
mod strategy;
#[allow(clippy::module_inception)]
mod vault;

pub use error::VaultError;
pub use records::{KeyRecord, KeyRecordStore, CURRENT_FORMAT_VERSION, LEGACY_FORMAT_VERSION};
pub use strategy::{decrypt, encrypt, Credentials, EncryptionMethod};
pub use vault::{CredentialVault, CREDENTIAL_TAG_KEY};
