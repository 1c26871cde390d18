//! # Shipping Service
//!
//! Node façade: owns the peer registry, the pending outbound index and the
//! inbound queue, implements [`ShippingApi`] for operators and
//! [`CallHandler`] for peers.

use crate::algorithms::exchange::{
    params, RemoteReply, CALL_INITIATE_TRANSFER, CALL_TRANSFER_REPLY,
};
use crate::domain::{
    parse_request_id, CatalogId, ItemCatalog, ItemRef, ManufactureReport, Origin, PeerRegistry,
    RequestIndex, RequestKey, SendFailure, SendReport, ShippingConfig, ShippingEnv, ShippingError,
    ShippingRequest,
};
use crate::ports::inbound::{CallHandler, ShippingApi};
use crate::ports::outbound::{ConfigProvider, ObjectLifecycle, RemoteTransport};
use async_trait::async_trait;
use fl_telemetry::{log_event, log_shipment_event};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

const COMPONENT: &str = "service";

/// One shipping node.
pub struct ShippingService {
    env: Arc<ShippingEnv>,
    peers: Arc<PeerRegistry>,
    auth_token: String,
    outbound: RequestIndex,
    inbound: RequestIndex,
}

impl ShippingService {
    /// Create a node from explicit parts.
    pub fn new(
        config: &ShippingConfig,
        catalog: ItemCatalog,
        peers: PeerRegistry,
        transport: Arc<dyn RemoteTransport>,
        world: Arc<dyn ObjectLifecycle>,
    ) -> Self {
        let env = ShippingEnv::new(config, Arc::new(catalog), transport, world);
        Self {
            env: Arc::new(env),
            peers: Arc::new(peers),
            auth_token: config.auth_token.clone(),
            outbound: RequestIndex::new(),
            inbound: RequestIndex::new(),
        }
    }

    /// Create a node from a configuration source.
    pub fn from_provider(
        provider: &dyn ConfigProvider,
        transport: Arc<dyn RemoteTransport>,
        world: Arc<dyn ObjectLifecycle>,
    ) -> Self {
        let config = provider.shipping_config();
        let catalog = ItemCatalog::new(provider.catalog_entries());
        let peers = PeerRegistry::new(provider.peers());

        log_event!(
            info,
            COMPONENT,
            "Shipping node configured",
            catalog_entries = catalog.len(),
            peers = peers.len()
        );

        Self::new(&config, catalog, peers, transport, world)
    }

    /// Shared request environment.
    pub fn env(&self) -> &Arc<ShippingEnv> {
        &self.env
    }

    /// Known peers.
    pub fn peers(&self) -> &PeerRegistry {
        &self.peers
    }

    /// Outbound requests awaiting a peer decision.
    pub fn outbound_index(&self) -> &RequestIndex {
        &self.outbound
    }

    /// Inbound requests awaiting a local decision.
    pub fn inbound_queue(&self) -> &RequestIndex {
        &self.inbound
    }

    fn dispatch(&self, caller_address: &str, call: &str, params: &HashMap<String, String>) -> RemoteReply {
        if params.get(params::AUTH).map(String::as_str) != Some(self.auth_token.as_str()) {
            log_event!(warn, COMPONENT, "Rejected call with bad auth token", caller = caller_address, call = call);
            return RemoteReply::with_status(403, ShippingError::Unauthorized.to_string());
        }

        match call {
            CALL_INITIATE_TRANSFER => self.receive_transfer(caller_address, params),
            CALL_TRANSFER_REPLY => self.receive_reply(params),
            other => RemoteReply::with_status(400, format!("unknown call: {:?}", other)),
        }
    }

    fn receive_transfer(&self, caller_address: &str, params: &HashMap<String, String>) -> RemoteReply {
        let requester = param(params, params::REQUESTER);
        let request_id = param(params, params::REQUEST_ID);

        let items: BTreeMap<CatalogId, u32> =
            match serde_json::from_str(param(params, params::ITEMS)) {
                Ok(items) => items,
                Err(e) => return RemoteReply::with_status(400, format!("malformed items: {}", e)),
            };

        let request = match ShippingRequest::inbound(
            Arc::clone(&self.env),
            Origin::new(caller_address),
            request_id,
            requester,
            items,
        ) {
            Ok(request) => request,
            Err(e) => return RemoteReply::with_status(400, e.to_string()),
        };

        match self.inbound.insert(request) {
            Ok(key) => {
                log_shipment_event!(info, COMPONENT, "Inbound transfer queued", key.request_id, key.origin);
                RemoteReply::ok("transfer queued")
            }
            Err(request) => {
                RemoteReply::with_status(409, ShippingError::Duplicate(request.key()).to_string())
            }
        }
    }

    fn receive_reply(&self, params: &HashMap<String, String>) -> RemoteReply {
        let request_id = match parse_request_id(param(params, params::REQUEST_ID)) {
            Ok(id) => id,
            Err(e) => return RemoteReply::with_status(400, e.to_string()),
        };

        let accept = match param(params, params::ACCEPT) {
            "1" => true,
            "0" => false,
            other => return RemoteReply::with_status(400, format!("invalid accept flag: {:?}", other)),
        };

        let key = RequestKey::local(request_id);
        let Some(mut request) = self.outbound.remove(&key) else {
            return RemoteReply::with_status(404, ShippingError::NotFound(key).to_string());
        };

        let outcome = if accept {
            request.accepted_outbound()
        } else {
            request.denied_outbound()
        };

        match outcome {
            Ok(count) => {
                log_shipment_event!(
                    info,
                    COMPONENT,
                    "Peer decision applied",
                    key.request_id,
                    key.origin,
                    accept = accept,
                    items = count,
                    approver = param(params, params::APPROVER)
                );
                RemoteReply::ok(if accept { "transfer completed" } else { "transfer cancelled" })
            }
            Err(e) => RemoteReply::with_status(500, e.to_string()),
        }
    }
}

fn param<'a>(params: &'a HashMap<String, String>, key: &str) -> &'a str {
    params.get(key).map(String::as_str).unwrap_or_default()
}

fn call_label(call: &str) -> &'static str {
    match call {
        CALL_INITIATE_TRANSFER => CALL_INITIATE_TRANSFER,
        CALL_TRANSFER_REPLY => CALL_TRANSFER_REPLY,
        _ => "unknown",
    }
}

impl CallHandler for ShippingService {
    fn handle_call(&self, caller_address: &str, params: &HashMap<String, String>) -> RemoteReply {
        let call = param(params, params::CALL);
        let reply = self.dispatch(caller_address, call, params);

        fl_telemetry::CALLS_HANDLED
            .with_label_values(&[call_label(call), &reply.status_code.to_string()])
            .inc();
        reply
    }
}

#[async_trait]
impl ShippingApi for ShippingService {
    fn create_outbound(
        &self,
        peer_name: &str,
        requester_id: &str,
        items: Vec<ItemRef>,
    ) -> Result<ShippingRequest, ShippingError> {
        let peer = self
            .peers
            .get(peer_name)
            .ok_or_else(|| ShippingError::UnknownPeer(peer_name.to_string()))?;
        Ok(ShippingRequest::outbound(
            Arc::clone(&self.env),
            peer,
            requester_id,
            items,
        )?)
    }

    async fn send(&self, request: ShippingRequest) -> Result<SendReport, SendFailure> {
        request.send(&self.outbound).await
    }

    async fn accept_inbound(
        &self,
        key: &RequestKey,
        approver_id: Option<&str>,
    ) -> Result<ManufactureReport, ShippingError> {
        let mut request = self
            .inbound
            .remove(key)
            .ok_or_else(|| ShippingError::NotFound(key.clone()))?;

        match request.accepted_inbound(approver_id).await {
            Ok(report) => Ok(report),
            Err(e) if e.is_protocol() => {
                // Nothing was sent or built, so the decision can be retried.
                if self.inbound.insert(request).is_err() {
                    log_event!(warn, COMPONENT, "Could not requeue inbound request", key = %key);
                }
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn deny_inbound(
        &self,
        key: &RequestKey,
        approver_id: Option<&str>,
    ) -> Result<(), ShippingError> {
        let mut request = self
            .inbound
            .remove(key)
            .ok_or_else(|| ShippingError::NotFound(key.clone()))?;

        match request.denied_inbound(approver_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if e.is_protocol() && self.inbound.insert(request).is_err() {
                    log_event!(warn, COMPONENT, "Could not requeue inbound request", key = %key);
                }
                Err(e)
            }
        }
    }

    fn pending_outbound(&self) -> Vec<RequestKey> {
        self.outbound.keys()
    }

    fn queued_inbound(&self) -> Vec<RequestKey> {
        self.inbound.keys()
    }
}
