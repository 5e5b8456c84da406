// Signet — Pending Event Models
//
// One PendingEvent per outstanding cross-context request. The payload is a
// closed kind-tagged union; the originating tab rides along so a response
// can be routed back after the privileged UI decides.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::gateway::error::GatewayError;
use crate::gateway::protocol::{
    ClientInfo, Method, Request, SignBytesParams, SignTransactionsParams,
};
use crate::platform::TabHandle;

/// Discriminant of a [`PendingEvent`]'s payload, used for kind-filtered
/// queue queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Connect,
    SignBytes,
    SignTransactions,
    DeepLink,
}

/// Kind-specific payload of a pending event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    Connect {
        client: ClientInfo,
    },
    SignBytes {
        client: ClientInfo,
        payload: Vec<u8>,
        signer: Vec<u8>,
    },
    SignTransactions {
        client: ClientInfo,
        payloads: Vec<Vec<u8>>,
        signer: Vec<u8>,
    },
    /// Out-of-band action arriving through a deep link rather than the
    /// request fabric. Has no originating tab and never gets a response.
    DeepLink {
        action: String,
        params: HashMap<String, String>,
    },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::Connect { .. } => EventKind::Connect,
            EventPayload::SignBytes { .. } => EventKind::SignBytes,
            EventPayload::SignTransactions { .. } => EventKind::SignTransactions,
            EventPayload::DeepLink { .. } => EventKind::DeepLink,
        }
    }

    /// Wire method name used when answering the event.
    pub fn method(&self) -> &'static str {
        match self {
            EventPayload::Connect { .. } => Method::Connect.as_str(),
            EventPayload::SignBytes { .. } => Method::SignBytes.as_str(),
            EventPayload::SignTransactions { .. } => Method::SignTransactions.as_str(),
            EventPayload::DeepLink { .. } => "deepLink",
        }
    }
}

/// An outstanding request or notification awaiting a decision in the
/// privileged context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingEvent {
    /// Caller-chosen correlation id, unique in the queue.
    pub id: String,
    /// Tab the request came from; `None` for out-of-band events.
    pub origin: Option<TabHandle>,
    #[serde(flatten)]
    pub payload: EventPayload,
}

impl PendingEvent {
    /// Build the pending event for an inbound wire request.
    pub fn from_request(request: &Request, origin: TabHandle) -> Result<Self, GatewayError> {
        let method = Method::parse(&request.method)
            .ok_or_else(|| GatewayError::MethodNotSupported(request.method.clone()))?;

        let payload = match method {
            Method::Connect => EventPayload::Connect {
                client: request.client.clone(),
            },
            Method::SignBytes => {
                let params: SignBytesParams = parse_params(request)?;
                EventPayload::SignBytes {
                    client: request.client.clone(),
                    payload: params.payload,
                    signer: params.signer,
                }
            }
            Method::SignTransactions => {
                let params: SignTransactionsParams = parse_params(request)?;
                EventPayload::SignTransactions {
                    client: request.client.clone(),
                    payloads: params.payloads,
                    signer: params.signer,
                }
            }
        };

        Ok(Self {
            id: request.id.clone(),
            origin: Some(origin),
            payload,
        })
    }

    /// Build an out-of-band deep-link event.
    pub fn deep_link(
        id: impl Into<String>,
        action: impl Into<String>,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            id: id.into(),
            origin: None,
            payload: EventPayload::DeepLink {
                action: action.into(),
                params,
            },
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(request: &Request) -> Result<T, GatewayError> {
    let params = request
        .params
        .clone()
        .ok_or_else(|| GatewayError::MalformedRequest(format!("{}: missing params", request.id)))?;

    serde_json::from_value(params)
        .map_err(|e| GatewayError::MalformedRequest(format!("{}: {}", request.id, e)))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
