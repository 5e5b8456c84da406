// Signet — Library root
//
// Security and messaging core for a browser-extension crypto wallet: a
// credential vault with interchangeable encryption strategies, a durable
// queue of pending cross-context requests, a registry of privileged UI
// windows, and the correlated request/response gateway between the page
// context and the privileged context.

pub mod error;
pub mod events;
pub mod gateway;
pub mod platform;
pub mod vault;
pub mod windows;

pub use error::{Result, SignetError};
