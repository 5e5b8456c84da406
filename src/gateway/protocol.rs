// Signet — Wire Protocol Types
//
// Message shapes exchanged over the host messaging fabric between the page
// context and the privileged context. Correlation is by caller-chosen
// request id; the method allow-list is closed and checked before anything
// is put on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// Error codes carried in response error objects. JSON-RPC-style negatives
// for protocol failures, 4001 for an explicit user decline.
pub const METHOD_NOT_SUPPORTED: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;
pub const USER_DECLINED: i32 = 4001;

/// Methods a page client is allowed to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Connect,
    SignBytes,
    SignTransactions,
}

impl Method {
    pub const ALL: [Method; 3] = [Method::Connect, Method::SignBytes, Method::SignTransactions];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Connect => "connect",
            Method::SignBytes => "signBytes",
            Method::SignTransactions => "signTransactions",
        }
    }

    /// Parse a wire method name. `None` means the method is not in the
    /// allow-list.
    pub fn parse(raw: &str) -> Option<Method> {
        Self::ALL.iter().copied().find(|m| m.as_str() == raw)
    }
}

/// Identity of the page-side client attached to every request, shown to
/// the user by the approval UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub origin: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_ref: Option<String>,
}

/// A correlated request from the page context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub client: ClientInfo,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// The privileged context's answer to one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub request_id: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorObject>,
}

impl Response {
    pub fn success(request_id: impl Into<String>, method: impl Into<String>, result: Value) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into(),
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(
        request_id: impl Into<String>,
        method: impl Into<String>,
        code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.into(),
            result: None,
            error: Some(ErrorObject {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Error payload of a failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
}

// ─── Typed Parameters and Results ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignBytesParams {
    pub payload: Vec<u8>,
    pub signer: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTransactionsParams {
    pub payloads: Vec<Vec<u8>>,
    pub signer: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignBytesResult {
    pub signature: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignTransactionsResult {
    pub signatures: Vec<Vec<u8>>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> ClientInfo {
        ClientInfo {
            origin: "https://dapp.example".to_string(),
            display_name: "Example Dapp".to_string(),
            icon_ref: None,
        }
    }

    #[test]
    fn test_method_parse_accepts_allow_list_only() {
        assert_eq!(Method::parse("connect"), Some(Method::Connect));
        assert_eq!(Method::parse("signBytes"), Some(Method::SignBytes));
        assert_eq!(Method::parse("signTransactions"), Some(Method::SignTransactions));

        assert_eq!(Method::parse("eth_sendTransaction"), None);
        assert_eq!(Method::parse("SIGNBYTES"), None);
        assert_eq!(Method::parse(""), None);
    }

    #[test]
    fn test_request_serialization_omits_missing_params() {
        let request = Request {
            id: "r1".to_string(),
            client: client(),
            method: "connect".to_string(),
            params: None,
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(!json.contains("\"params\""));
        assert!(json.contains("\"displayName\""));
    }

    #[test]
    fn test_success_response_has_no_error_field() {
        let response = Response::success("r1", "signBytes", json!({"ok": true}));
        let json = serde_json::to_string(&response).unwrap();

        assert!(json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
        assert!(json.contains("\"requestId\":\"r1\""));
    }

    #[test]
    fn test_failure_response_carries_code_and_message() {
        let response = Response::failure("r1", "signBytes", USER_DECLINED, "declined");
        let json = serde_json::to_string(&response).unwrap();

        assert!(!json.contains("\"result\""));
        assert!(json.contains("4001"));
        assert!(json.contains("declined"));
    }

    #[test]
    fn test_sign_bytes_params_round_trip() {
        let params = SignBytesParams {
            payload: vec![1, 2, 3],
            signer: vec![0xA0; 32],
        };

        let value = serde_json::to_value(&params).unwrap();
        let back: SignBytesParams = serde_json::from_value(value).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn test_response_round_trip() {
        let response = Response::failure("r9", "connect", INTERNAL_ERROR, "boom");
        let value = serde_json::to_value(&response).unwrap();
        let back: Response = serde_json::from_value(value).unwrap();
        assert_eq!(back, response);
    }
}
