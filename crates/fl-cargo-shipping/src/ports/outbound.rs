//! # Outbound Ports
//!
//! Traits for external collaborators: the remote-call transport, the game
//! world's object model, and configuration sources.

use crate::algorithms::exchange::RemoteReply;
use crate::domain::{
    CatalogId, ItemRef, LocalKind, Location, Peer, ShippingConfig, WorldError,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Remote-call primitive - outbound port.
///
/// One call-and-response exchange per invocation. `None` means no response
/// was observed; otherwise the raw response body is returned unparsed.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Send `params` to `address` and wait for the response body.
    async fn call(&self, address: &str, params: &[(String, String)]) -> Option<String>;
}

/// Game world object lifecycle - outbound port.
pub trait ObjectLifecycle: Send + Sync {
    /// Remove an item from the world.
    fn destroy(&self, item: &ItemRef);

    /// Move an item to `location`.
    fn relocate(&self, item: &ItemRef, location: Location);

    /// Create one instance of `kind` at `location`.
    fn construct(&self, kind: &LocalKind, location: Location) -> Result<ItemRef, WorldError>;
}

/// Startup configuration source - outbound port.
pub trait ConfigProvider: Send + Sync {
    /// Node settings.
    fn shipping_config(&self) -> ShippingConfig;

    /// Catalog entries as `(local kind, canonical id)`, in registration order.
    fn catalog_entries(&self) -> Vec<(LocalKind, CatalogId)>;

    /// Known peers.
    fn peers(&self) -> Vec<Peer>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// A call captured by [`MockTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    /// Target address.
    pub address: String,
    /// Parameters as sent.
    pub params: Vec<(String, String)>,
}

impl RecordedCall {
    /// Value of a parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Mock transport for testing.
///
/// Replies are served from a script, then from the fallback reply.
#[derive(Default)]
pub struct MockTransport {
    scripted: Mutex<VecDeque<Option<String>>>,
    fallback: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Transport that never answers.
    pub fn silent() -> Self {
        Self::default()
    }

    /// Transport that always answers with `reply`.
    pub fn replying(reply: RemoteReply) -> Self {
        Self {
            fallback: reply.to_json().ok(),
            ..Self::default()
        }
    }

    /// Transport that always answers with a raw body.
    pub fn replying_raw(body: impl Into<String>) -> Self {
        Self {
            fallback: Some(body.into()),
            ..Self::default()
        }
    }

    /// Queue a one-off answer ahead of the fallback.
    pub fn push_reply(&self, reply: Option<RemoteReply>) {
        self.scripted
            .lock()
            .push_back(reply.and_then(|r| r.to_json().ok()));
    }

    /// Calls seen so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl RemoteTransport for MockTransport {
    async fn call(&self, address: &str, params: &[(String, String)]) -> Option<String> {
        self.calls.lock().push(RecordedCall {
            address: address.to_string(),
            params: params.to_vec(),
        });

        let scripted = self.scripted.lock().pop_front();
        match scripted {
            Some(reply) => reply,
            None => self.fallback.clone(),
        }
    }
}
