// Signet — Platform Collaborators
//
// Interfaces to everything the host platform owns: storage, windowing, the
// messaging fabric, the platform authenticator, and the signing backend.
// Each collaborator is a trait injected into the components that need it,
// with an in-memory fake alongside for tests.

mod authenticator;
mod fabric;
mod signer;
mod sqlite;
mod storage;
mod windows;

pub use authenticator::{
    AuthenticatorEnrollment, AuthenticatorError, KeyringAuthenticator, PlatformAuthenticator,
};
pub use fabric::{EventNotice, FabricError, MessageFabric, TabHandle};
pub use signer::{Signer, SignerError};
pub use sqlite::SqliteStorage;
pub use storage::{MemoryStorage, StorageArea, StorageError};
pub use windows::{HostWindow, WindowGeometry, WindowHost, WindowHostError, WindowId};

#[cfg(test)]
pub use authenticator::mock::MockAuthenticator;
#[cfg(test)]
pub use fabric::mock::MockFabric;
#[cfg(test)]
pub use signer::mock::MockSigner;
#[cfg(test)]
pub use windows::mock::MockWindowHost;
