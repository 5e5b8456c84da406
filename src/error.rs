// Signet — Top-level error types
//
// Aggregates errors from the vault, events, windows, gateway, and platform
// modules into a single error enum for the crate boundary.

use thiserror::Error;

/// Top-level error type for all Signet operations.
#[derive(Debug, Error)]
pub enum SignetError {
    #[error("vault error: {0}")]
    Vault(#[from] crate::vault::VaultError),

    #[error("event queue error: {0}")]
    Queue(#[from] crate::events::QueueError),

    #[error("window registry error: {0}")]
    Registry(#[from] crate::windows::RegistryError),

    #[error("gateway error: {0}")]
    Gateway(#[from] crate::gateway::GatewayError),

    #[error("storage error: {0}")]
    Storage(#[from] crate::platform::StorageError),

    #[error("authenticator error: {0}")]
    Authenticator(#[from] crate::platform::AuthenticatorError),

    #[error("signing error: {0}")]
    Signer(#[from] crate::platform::SignerError),

    /// Catch-all for unexpected collaborator failures, always wrapping the
    /// underlying cause's message.
    #[error("unknown error: {0}")]
    Unknown(String),
}

pub type Result<T> = std::result::Result<T, SignetError>;
