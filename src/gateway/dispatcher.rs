// Signet — Privileged-Side Event Dispatcher
//
// Receives inbound requests, persists them, and makes sure a privileged
// window is looking at them. Persisting to the queue comes first: it is
// the durability boundary, and everything after it can be redone from the
// queue if the process dies. An already-open window gets an id-only
// notice; otherwise a window is opened with the id in its URL so the fresh
// UI can find its event without the notification channel at all.

use std::sync::Arc;

use serde_json::Value;

use super::error::GatewayError;
use super::protocol::{
    ErrorObject, Response, SignBytesResult, SignTransactionsResult, INTERNAL_ERROR,
    USER_DECLINED,
};
use crate::events::{EventPayload, EventQueue, PendingEvent};
use crate::platform::{EventNotice, MessageFabric, Signer, TabHandle};
use crate::vault::{CredentialVault, Credentials};
use crate::windows::{AppWindowRegistry, WindowType};

pub struct EventDispatcher {
    queue: EventQueue,
    registry: AppWindowRegistry,
    fabric: Arc<dyn MessageFabric>,
    vault: Arc<CredentialVault>,
    signer: Arc<dyn Signer>,
}

impl EventDispatcher {
    pub fn new(
        queue: EventQueue,
        registry: AppWindowRegistry,
        fabric: Arc<dyn MessageFabric>,
        vault: Arc<CredentialVault>,
        signer: Arc<dyn Signer>,
    ) -> Self {
        Self {
            queue,
            registry,
            fabric,
            vault,
            signer,
        }
    }

    /// Cold-start housekeeping: reconcile the window registry before any
    /// routing decision trusts it.
    pub async fn hydrate(&self) -> Result<(), GatewayError> {
        self.registry.hydrate().await?;
        Ok(())
    }

    /// Handle one inbound request from the fabric.
    pub async fn dispatch(
        &self,
        request: &super::protocol::Request,
        origin: TabHandle,
    ) -> Result<(), GatewayError> {
        let event = PendingEvent::from_request(request, origin)?;

        // Durability boundary: from here on the request survives a kill of
        // the privileged process.
        self.queue.save_or_replace(&event).await?;

        let open = self.registry.get_by_type(WindowType::Main).await?;
        match open.first() {
            Some(window) => {
                let notice = EventNotice {
                    event_id: event.id.clone(),
                };
                if let Err(e) = self.fabric.notify_window(window.window_id, &notice).await {
                    // The queue, not the notice, is the source of truth;
                    // the UI will still find the event there.
                    tracing::warn!(
                        window_id = window.window_id,
                        event_id = %event.id,
                        error = %e,
                        "failed to notify open window"
                    );
                }
            }
            None => {
                self.registry
                    .create_window(WindowType::Main, &[("event", &event.id)], None)
                    .await?;
            }
        }

        tracing::info!(event_id = %event.id, method = %request.method, "request queued");
        Ok(())
    }

    // ─── UI Outcomes ─────────────────────────────────────────────────────────

    /// Approve a signing event: decrypt the signer's key, sign every
    /// payload, answer the originating tab, and drop the event. Key bytes
    /// exist only for the duration of the signing call.
    pub async fn approve_sign(
        &self,
        event_id: &str,
        credentials: &Credentials,
    ) -> Result<(), GatewayError> {
        let event = self.require_event(event_id).await?;

        let result = match &event.payload {
            EventPayload::SignBytes {
                payload, signer, ..
            } => {
                let private_key = self.vault.get_decrypted(signer, credentials).await?;
                let signature = self.signer.sign(&private_key, payload)?;
                serde_json::to_value(SignBytesResult { signature })
                    .map_err(|e| GatewayError::MalformedRequest(e.to_string()))?
            }
            EventPayload::SignTransactions {
                payloads, signer, ..
            } => {
                let private_key = self.vault.get_decrypted(signer, credentials).await?;
                let mut signatures = Vec::with_capacity(payloads.len());
                for payload in payloads {
                    signatures.push(self.signer.sign(&private_key, payload)?);
                }
                serde_json::to_value(SignTransactionsResult { signatures })
                    .map_err(|e| GatewayError::MalformedRequest(e.to_string()))?
            }
            other => {
                return Err(GatewayError::MalformedRequest(format!(
                    "event {} is not a signing request ({:?} kind)",
                    event_id,
                    other.kind()
                )))
            }
        };

        self.respond(&event, Ok(result)).await
    }

    /// Resolve an event with an arbitrary successful result (connect
    /// approvals and other non-signing flows).
    pub async fn resolve(&self, event_id: &str, result: Value) -> Result<(), GatewayError> {
        let event = self.require_event(event_id).await?;
        self.respond(&event, Ok(result)).await
    }

    /// Reject an event with an explicit error.
    pub async fn reject(&self, event_id: &str, error: ErrorObject) -> Result<(), GatewayError> {
        let event = self.require_event(event_id).await?;
        self.respond(&event, Err(error)).await
    }

    /// User dismissal: equivalent to rejecting with a user-declined error,
    /// then removing the event.
    pub async fn decline(&self, event_id: &str) -> Result<(), GatewayError> {
        self.reject(
            event_id,
            ErrorObject {
                code: USER_DECLINED,
                message: "user declined the request".to_string(),
            },
        )
        .await
    }

    async fn require_event(&self, event_id: &str) -> Result<PendingEvent, GatewayError> {
        self.queue
            .fetch_by_id(event_id)
            .await?
            .ok_or_else(|| GatewayError::UnknownEvent(event_id.to_string()))
    }

    /// Send the outcome back to the originating tab and drop the event.
    /// The event is removed even for events without an origin (deep
    /// links), which simply have nowhere to report to.
    async fn respond(
        &self,
        event: &PendingEvent,
        outcome: Result<Value, ErrorObject>,
    ) -> Result<(), GatewayError> {
        if let Some(origin) = event.origin {
            let response = match outcome {
                Ok(result) => Response::success(&event.id, event.payload.method(), result),
                Err(error) => Response::failure(
                    &event.id,
                    event.payload.method(),
                    error.code,
                    error.message,
                ),
            };
            self.fabric.send_response(origin, &response).await?;
        }

        self.queue.remove_by_id(&event.id).await?;
        tracing::info!(event_id = %event.id, "event resolved and removed");
        Ok(())
    }
}

/// Convert a dispatcher-side failure into the wire error object carried by
/// a failure response.
pub fn error_object_for(error: &GatewayError) -> ErrorObject {
    let code = match error {
        GatewayError::MethodNotSupported(_) => super::protocol::METHOD_NOT_SUPPORTED,
        GatewayError::MalformedRequest(_) => super::protocol::INVALID_PARAMS,
        GatewayError::UserDeclined(_) => USER_DECLINED,
        _ => INTERNAL_ERROR,
    };
    ErrorObject {
        code,
        message: error.to_string(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
