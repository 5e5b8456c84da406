// Signet — Events Module
//
// Durable, idempotent queue of pending cross-context requests, keyed by
// correlation id.

mod models;
mod queue;

pub use models::{EventKind, EventPayload, PendingEvent};
pub use queue::{EventQueue, QueueError};
