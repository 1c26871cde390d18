//! # Request/Reply Exchange
//!
//! Wire encoding of the two remote calls and evaluation of the status
//! document a peer answers with.
//!
//! Request leg: flat key/value parameters (`call`, `auth`, then per-call
//! fields; `items` is a JSON object). Response leg:
//! `{"statusCode": <int>, "response": <string>}`, where only 200 succeeds.

use crate::domain::{CatalogId, ShippingError};
use crate::ports::outbound::RemoteTransport;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Call type that offers a transfer to a peer.
pub const CALL_INITIATE_TRANSFER: &str = "initiate-transfer";
/// Call type that answers an offered transfer.
pub const CALL_TRANSFER_REPLY: &str = "transfer-reply";
/// The only status code treated as success.
pub const STATUS_OK: i64 = 200;
/// Approver recorded when none is given.
pub const DEFAULT_APPROVER: &str = "server";

/// Parameter names.
pub mod params {
    /// Call type.
    pub const CALL: &str = "call";
    /// Shared secret.
    pub const AUTH: &str = "auth";
    /// Initiating user.
    pub const REQUESTER: &str = "requester";
    /// Request id within the origin.
    pub const REQUEST_ID: &str = "requestId";
    /// JSON object of identifier to count.
    pub const ITEMS: &str = "items";
    /// Deciding user.
    pub const APPROVER: &str = "approver";
    /// "1" for accept, "0" for deny.
    pub const ACCEPT: &str = "accept";
}

/// One remote call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallPayload {
    /// Offer a transfer to a peer.
    InitiateTransfer {
        /// Initiating user.
        requester: String,
        /// Request id on the sending server.
        request_id: u64,
        /// Identifier to count.
        items: BTreeMap<CatalogId, u32>,
    },
    /// Answer a transfer offered by the origin.
    TransferReply {
        /// Deciding user.
        approver: String,
        /// Accept or deny.
        accept: bool,
        /// Request id on the origin server.
        request_id: u64,
    },
}

impl CallPayload {
    /// Wire name of the call.
    pub fn call_type(&self) -> &'static str {
        match self {
            Self::InitiateTransfer { .. } => CALL_INITIATE_TRANSFER,
            Self::TransferReply { .. } => CALL_TRANSFER_REPLY,
        }
    }

    /// Encode as flat query parameters, auth token included.
    pub fn to_params(&self, auth_token: &str) -> Result<Vec<(String, String)>, ShippingError> {
        let mut out = vec![
            (params::CALL.to_string(), self.call_type().to_string()),
            (params::AUTH.to_string(), auth_token.to_string()),
        ];

        match self {
            Self::InitiateTransfer {
                requester,
                request_id,
                items,
            } => {
                let items = serde_json::to_string(items)
                    .map_err(|e| ShippingError::Encoding(e.to_string()))?;
                out.push((params::REQUESTER.to_string(), requester.clone()));
                out.push((params::REQUEST_ID.to_string(), request_id.to_string()));
                out.push((params::ITEMS.to_string(), items));
            }
            Self::TransferReply {
                approver,
                accept,
                request_id,
            } => {
                let accept = if *accept { "1" } else { "0" };
                out.push((params::APPROVER.to_string(), approver.clone()));
                out.push((params::ACCEPT.to_string(), accept.to_string()));
                out.push((params::REQUEST_ID.to_string(), request_id.to_string()));
            }
        }

        Ok(out)
    }
}

/// Status document returned by a peer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteReply {
    /// Status code; 200 is success.
    #[serde(rename = "statusCode")]
    pub status_code: i64,
    /// Human-readable message.
    #[serde(default)]
    pub response: String,
}

impl RemoteReply {
    /// Successful reply.
    pub fn ok(response: impl Into<String>) -> Self {
        Self::with_status(STATUS_OK, response)
    }

    /// Reply with an arbitrary status.
    pub fn with_status(status_code: i64, response: impl Into<String>) -> Self {
        Self {
            status_code,
            response: response.into(),
        }
    }

    /// Whether the status is 200.
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }

    /// Encode as the JSON body sent back to the caller.
    pub fn to_json(&self) -> Result<String, ShippingError> {
        serde_json::to_string(self).map_err(|e| ShippingError::Encoding(e.to_string()))
    }
}

/// Classify the raw outcome of a remote call.
///
/// `None` is "no response"; a body that is not a JSON object with an integer
/// `statusCode` is malformed; any status other than 200 is a rejection
/// carrying the remote's `response` text.
pub fn evaluate_reply(body: Option<String>) -> Result<RemoteReply, ShippingError> {
    let body = body.ok_or(ShippingError::NoResponse)?;

    let value: serde_json::Value = serde_json::from_str(&body)
        .map_err(|e| ShippingError::MalformedResponse(e.to_string()))?;

    let message = value
        .get("response")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let Some(status) = value.get("statusCode").and_then(|v| v.as_i64()) else {
        let detail = if message.is_empty() {
            "missing statusCode".to_string()
        } else {
            format!("missing statusCode: {}", message)
        };
        return Err(ShippingError::MalformedResponse(detail));
    };

    if status != STATUS_OK {
        return Err(ShippingError::Rejected {
            status,
            message: if message.is_empty() {
                "no message".to_string()
            } else {
                message
            },
        });
    }

    Ok(RemoteReply::with_status(status, message))
}

/// Issues authenticated calls over a [`RemoteTransport`].
#[derive(Clone)]
pub struct TransportClient {
    transport: Arc<dyn RemoteTransport>,
    auth_token: String,
}

impl TransportClient {
    /// Create a client that attaches `auth_token` to every call.
    pub fn new(transport: Arc<dyn RemoteTransport>, auth_token: impl Into<String>) -> Self {
        Self {
            transport,
            auth_token: auth_token.into(),
        }
    }

    /// Perform one call and evaluate the reply.
    pub async fn exchange(
        &self,
        address: &str,
        payload: &CallPayload,
    ) -> Result<RemoteReply, ShippingError> {
        let params = payload.to_params(&self.auth_token)?;
        let body = self.transport.call(address, &params).await;
        let outcome = evaluate_reply(body);

        if let Err(e) = &outcome {
            fl_telemetry::PROTOCOL_FAILURES
                .with_label_values(&[payload.call_type(), e.kind_label()])
                .inc();
        }

        outcome
    }
}

impl fmt::Debug for TransportClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportClient")
            .field("auth_token", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::MockTransport;

    fn lookup<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_initiate_transfer_params() {
        let mut items = BTreeMap::new();
        items.insert(CatalogId::new("ore_sample"), 3);
        let payload = CallPayload::InitiateTransfer {
            requester: "alice".to_string(),
            request_id: 17,
            items,
        };

        let params = payload.to_params("secret").unwrap();
        assert_eq!(lookup(&params, "call"), Some("initiate-transfer"));
        assert_eq!(lookup(&params, "auth"), Some("secret"));
        assert_eq!(lookup(&params, "requester"), Some("alice"));
        assert_eq!(lookup(&params, "requestId"), Some("17"));
        assert_eq!(lookup(&params, "items"), Some(r#"{"ore_sample":3}"#));
    }

    #[test]
    fn test_transfer_reply_params() {
        let payload = CallPayload::TransferReply {
            approver: DEFAULT_APPROVER.to_string(),
            accept: false,
            request_id: 5,
        };

        let params = payload.to_params("secret").unwrap();
        assert_eq!(lookup(&params, "call"), Some("transfer-reply"));
        assert_eq!(lookup(&params, "approver"), Some("server"));
        assert_eq!(lookup(&params, "accept"), Some("0"));
        assert_eq!(lookup(&params, "requestId"), Some("5"));
    }

    #[test]
    fn test_evaluate_no_response() {
        assert_eq!(evaluate_reply(None), Err(ShippingError::NoResponse));
    }

    #[test]
    fn test_evaluate_success() {
        let reply = evaluate_reply(Some(r#"{"statusCode":200,"response":"ok"}"#.into())).unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.response, "ok");
    }

    #[test]
    fn test_evaluate_rejection_embeds_message() {
        let err =
            evaluate_reply(Some(r#"{"statusCode":403,"response":"auth rejected"}"#.into()))
                .unwrap_err();
        assert_eq!(
            err,
            ShippingError::Rejected {
                status: 403,
                message: "auth rejected".to_string()
            }
        );
    }

    #[test]
    fn test_evaluate_unparsable_body() {
        assert!(matches!(
            evaluate_reply(Some("<html>502</html>".into())),
            Err(ShippingError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_evaluate_missing_status_keeps_message() {
        let err = evaluate_reply(Some(r#"{"response":"try later"}"#.into())).unwrap_err();
        assert!(err.to_string().contains("try later"));
    }

    #[tokio::test]
    async fn test_client_attaches_token() {
        let transport = Arc::new(MockTransport::replying(RemoteReply::ok("queued")));
        let client = TransportClient::new(transport.clone(), "hunter2");
        let payload = CallPayload::TransferReply {
            approver: "bob".to_string(),
            accept: true,
            request_id: 1,
        };

        client.exchange("http://peer", &payload).await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].address, "http://peer");
        assert_eq!(calls[0].param("auth"), Some("hunter2"));
    }

    #[tokio::test]
    async fn test_client_reports_non_json_body() {
        let transport = Arc::new(MockTransport::replying_raw("<html>502 Bad Gateway</html>"));
        let client = TransportClient::new(transport.clone(), "hunter2");
        let payload = CallPayload::TransferReply {
            approver: "bob".to_string(),
            accept: false,
            request_id: 2,
        };

        let err = client.exchange("http://peer", &payload).await.unwrap_err();

        assert!(matches!(err, ShippingError::MalformedResponse(_)));
        assert_eq!(transport.calls().len(), 1);
    }

    #[test]
    fn test_client_debug_redacts_token() {
        let client = TransportClient::new(Arc::new(MockTransport::silent()), "hunter2");
        assert!(!format!("{:?}", client).contains("hunter2"));
    }
}
