// Signet — Gateway error types

use thiserror::Error;

use crate::events::QueueError;
use crate::platform::{FabricError, SignerError};
use crate::vault::VaultError;
use crate::windows::RegistryError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("method not supported: {0}")]
    MethodNotSupported(String),

    #[error("request timed out: {0}")]
    MethodTimedOut(String),

    #[error("user declined request {0}")]
    UserDeclined(String),

    #[error("malformed request: {0}")]
    MalformedRequest(String),

    #[error("no pending event with id {0}")]
    UnknownEvent(String),

    #[error("remote error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("response channel closed before a response arrived")]
    ChannelClosed,

    #[error("message fabric error: {0}")]
    Fabric(#[from] FabricError),

    #[error("event queue error: {0}")]
    Queue(#[from] QueueError),

    #[error("window registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("vault error: {0}")]
    Vault(#[from] VaultError),

    #[error("signing error: {0}")]
    Signer(#[from] SignerError),
}
