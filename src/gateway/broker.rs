// Signet — Page-Side Request Broker
//
// Turns a method call into a correlated wire request and resolves the
// caller's future from the first matching response. One correlation table
// of oneshot senders replaces per-call listener bookkeeping: an entry is
// removed exactly once, by whichever of response delivery, timeout, or
// send failure settles first, so resolution is at-most-once by
// construction. Responses with an untracked id are discarded, which keeps
// delivery safe under the fabric's fan-out to every tab.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use super::error::GatewayError;
use super::protocol::{ClientInfo, Method, Request, Response};
use crate::platform::MessageFabric;

/// Default wall-clock budget for one request. Approval flows wait on a
/// human, so this is minutes-scale, not RPC-scale.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

pub struct RequestBroker {
    fabric: Arc<dyn MessageFabric>,
    client: ClientInfo,
    timeout: Duration,
    pending: Mutex<HashMap<String, oneshot::Sender<Response>>>,
}

impl RequestBroker {
    pub fn new(fabric: Arc<dyn MessageFabric>, client: ClientInfo) -> Self {
        Self {
            fabric,
            client,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Issue a request with a generated correlation id.
    pub async fn request(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Option<Value>, GatewayError> {
        let id = Uuid::new_v4().to_string();
        self.request_with_id(&id, method, params).await
    }

    /// Issue a request under a caller-chosen correlation id and wait for
    /// whichever of the matching response, the timeout, or a send failure
    /// settles first.
    pub async fn request_with_id(
        &self,
        id: &str,
        method: &str,
        params: Option<Value>,
    ) -> Result<Option<Value>, GatewayError> {
        // Unsupported methods fail before anything is sent.
        if Method::parse(method).is_none() {
            return Err(GatewayError::MethodNotSupported(method.to_string()));
        }

        let (sender, receiver) = oneshot::channel();
        self.pending().insert(id.to_string(), sender);

        let request = Request {
            id: id.to_string(),
            client: self.client.clone(),
            method: method.to_string(),
            params,
        };

        if let Err(e) = self.fabric.send_request(&request).await {
            self.pending().remove(id);
            return Err(e.into());
        }

        match tokio::time::timeout(self.timeout, receiver).await {
            Ok(Ok(response)) => match response.error {
                Some(error) => Err(GatewayError::Remote {
                    code: error.code,
                    message: error.message,
                }),
                None => Ok(response.result),
            },
            Ok(Err(_)) => {
                self.pending().remove(id);
                Err(GatewayError::ChannelClosed)
            }
            Err(_) => {
                self.pending().remove(id);
                tracing::debug!(%id, %method, "request timed out; id no longer tracked");
                Err(GatewayError::MethodTimedOut(method.to_string()))
            }
        }
    }

    /// Feed an inbound response from the fabric. The first response whose
    /// id matches a tracked call resolves it; anything else is dropped.
    pub fn handle_response(&self, response: Response) {
        let sender = self.pending().remove(&response.request_id);
        match sender {
            // The receiver may already be gone if the timeout won the
            // race; that send failure is the no-op the loser deserves.
            Some(sender) => {
                let _ = sender.send(response);
            }
            None => {
                tracing::debug!(
                    request_id = %response.request_id,
                    "discarding response with no tracked call"
                );
            }
        }
    }

    /// Number of calls currently awaiting a response.
    pub fn in_flight(&self) -> usize {
        self.pending().len()
    }

    fn pending(&self) -> MutexGuard<'_, HashMap<String, oneshot::Sender<Response>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
