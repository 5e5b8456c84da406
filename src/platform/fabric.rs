// Signet — Host Messaging Fabric Collaborator
//
// Carries wire messages between the page context, the privileged background
// process, and privileged UI windows. Delivery fans out to every listening
// context; correlation by request id, not addressing, is what keeps
// responses safe under that fan-out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::windows::WindowId;
use crate::gateway::protocol::{Request, Response};

/// Host-assigned handle of the browser tab a request originated from.
pub type TabHandle = u32;

#[derive(Debug, Error)]
pub enum FabricError {
    #[error("message fabric error: {0}")]
    Send(String),
}

/// Lightweight "new event available" notification for an already-open
/// privileged window. Carries only the event id: the window pulls the full
/// payload from the queue, so a slow reader never acts on a stale copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventNotice {
    pub event_id: String,
}

/// Messaging operations consumed by the broker and dispatcher.
#[async_trait]
pub trait MessageFabric: Send + Sync {
    /// Page side: deliver a request to the privileged context.
    async fn send_request(&self, request: &Request) -> Result<(), FabricError>;

    /// Privileged side: deliver a response to the originating tab.
    async fn send_response(&self, tab: TabHandle, response: &Response)
        -> Result<(), FabricError>;

    /// Privileged side: nudge an open window about a queued event.
    async fn notify_window(
        &self,
        window: WindowId,
        notice: &EventNotice,
    ) -> Result<(), FabricError>;
}

// ─── Recording Mock for Testing ──────────────────────────────────────────────
