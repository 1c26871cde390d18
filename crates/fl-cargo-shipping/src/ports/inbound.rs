//! # Inbound Ports
//!
//! What a shipping node offers: the operator-facing API and the handler for
//! remote calls arriving from peers.

use crate::algorithms::exchange::RemoteReply;
use crate::domain::{
    ItemRef, ManufactureReport, RequestKey, SendFailure, SendReport, ShippingError,
    ShippingRequest,
};
use async_trait::async_trait;
use std::collections::HashMap;

/// Shipping API - inbound port.
#[async_trait]
pub trait ShippingApi: Send + Sync {
    /// Build an outbound request for items addressed to a named peer.
    fn create_outbound(
        &self,
        peer_name: &str,
        requester_id: &str,
        items: Vec<ItemRef>,
    ) -> Result<ShippingRequest, ShippingError>;

    /// Offer an outbound request to its peer.
    async fn send(&self, request: ShippingRequest) -> Result<SendReport, SendFailure>;

    /// Accept a queued inbound request.
    async fn accept_inbound(
        &self,
        key: &RequestKey,
        approver_id: Option<&str>,
    ) -> Result<ManufactureReport, ShippingError>;

    /// Deny a queued inbound request.
    async fn deny_inbound(
        &self,
        key: &RequestKey,
        approver_id: Option<&str>,
    ) -> Result<(), ShippingError>;

    /// Outbound requests awaiting the peer's decision.
    fn pending_outbound(&self) -> Vec<RequestKey>;

    /// Inbound requests awaiting a local decision.
    fn queued_inbound(&self) -> Vec<RequestKey>;
}

/// Remote call handler - inbound port.
///
/// Answers one call from `caller_address` with a status document. Never
/// fails; every problem becomes a non-200 status.
pub trait CallHandler: Send + Sync {
    /// Handle one call.
    fn handle_call(&self, caller_address: &str, params: &HashMap<String, String>) -> RemoteReply;
}
