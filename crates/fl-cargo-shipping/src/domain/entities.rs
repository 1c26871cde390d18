//! # Domain Entities
//!
//! The shipping request: one instance per transfer attempt, inbound or
//! outbound, driving at most one protocol step per operation.
//!
//! ```text
//! outbound:  new ──send──► pending index ──accepted_outbound──► items destroyed
//!                                        └─denied_outbound────► items relocated
//! inbound:   new ──accepted_inbound──► reply(accept=1) ──► items manufactured
//!                └─denied_inbound────► reply(accept=0)
//! ```

use super::catalog::ItemCatalog;
use super::config::ShippingConfig;
use super::errors::{ConstructionError, ShippingError, UNKNOWN_ERROR};
use super::index::RequestIndex;
use super::invariants::{
    invariant_manifest_valid, invariant_origin_matches, invariant_peer_present,
    invariant_requester_present, parse_request_id,
};
use super::peers::Peer;
use super::value_objects::{
    CatalogId, Direction, ItemRef, Location, Manifest, Origin, RequestKey,
};
use crate::algorithms::exchange::{CallPayload, TransportClient, DEFAULT_APPROVER};
use crate::algorithms::manifest::{apply_allow_list, translate_items};
use crate::algorithms::sequence::next_request_id;
use crate::ports::outbound::{ObjectLifecycle, RemoteTransport};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

const COMPONENT: &str = "request";

/// Collaborators shared by every request on a node.
pub struct ShippingEnv {
    /// Item type translation.
    pub catalog: Arc<ItemCatalog>,
    /// World object lifecycle.
    pub world: Arc<dyn ObjectLifecycle>,
    /// Authenticated remote calls.
    pub client: TransportClient,
    /// Where manufactured items are placed.
    pub drop_location: Location,
    /// Where denied outbound items are moved.
    pub fallback_location: Location,
}

impl ShippingEnv {
    /// Assemble an environment from node settings.
    pub fn new(
        config: &ShippingConfig,
        catalog: Arc<ItemCatalog>,
        transport: Arc<dyn RemoteTransport>,
        world: Arc<dyn ObjectLifecycle>,
    ) -> Self {
        Self {
            catalog,
            world,
            client: TransportClient::new(transport, config.auth_token.clone()),
            drop_location: config.drop_location,
            fallback_location: config.fallback_location,
        }
    }
}

impl fmt::Debug for ShippingEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShippingEnv")
            .field("catalog_entries", &self.catalog.len())
            .field("drop_location", &self.drop_location)
            .field("fallback_location", &self.fallback_location)
            .finish_non_exhaustive()
    }
}

/// Parameters for creating a shipping request.
#[derive(Clone, Debug)]
pub struct RequestParams {
    /// Transfer direction.
    pub direction: Direction,
    /// Origin marker; "local" for outbound.
    pub origin: Origin,
    /// Target peer; required for outbound.
    pub peer: Option<Arc<Peer>>,
    /// Initiating user.
    pub requester_id: String,
    /// Items to transfer.
    pub items: Manifest,
    /// Raw request id as received; read for inbound requests only.
    pub request_id: Option<String>,
}

/// Outcome of a successful [`ShippingRequest::send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendReport {
    /// Key the request is now held under.
    pub key: RequestKey,
    /// Identifier to count, as transmitted.
    pub shipped: BTreeMap<CatalogId, u32>,
    /// Instances left out for lack of a catalog entry.
    pub dropped_uncatalogued: usize,
    /// Instances left out by the peer's allow-list.
    pub dropped_disallowed: usize,
}

/// A send that did not go through. The request is handed back intact.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct SendFailure {
    /// What went wrong.
    pub error: ShippingError,
    /// The request, with `last_error` set.
    pub request: Box<ShippingRequest>,
}

/// Outcome of a successful [`ShippingRequest::accepted_inbound`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManufactureReport {
    /// Instances constructed at the drop location.
    pub constructed: Vec<ItemRef>,
    /// Identifiers skipped for lack of a catalog mapping.
    pub skipped_unmapped: usize,
}

/// One transfer attempt.
pub struct ShippingRequest {
    request_id: u64,
    origin: Origin,
    direction: Direction,
    peer: Option<Arc<Peer>>,
    requester_id: String,
    items: Manifest,
    created_at: Instant,
    last_error: String,
    env: Arc<ShippingEnv>,
}

impl ShippingRequest {
    /// Create a request, validating every construction invariant.
    ///
    /// Outbound requests draw a fresh id from the process-wide sequence;
    /// inbound requests parse the id supplied by the peer.
    pub fn new(env: Arc<ShippingEnv>, params: RequestParams) -> Result<Self, ConstructionError> {
        let RequestParams {
            direction,
            origin,
            peer,
            requester_id,
            items,
            request_id,
        } = params;

        invariant_requester_present(&requester_id)?;
        invariant_manifest_valid(direction, &items)?;
        invariant_origin_matches(&origin, direction)?;
        invariant_peer_present(direction, peer.as_deref())?;

        let request_id = match direction {
            Direction::Outbound => next_request_id(),
            Direction::Inbound => {
                let raw = request_id.ok_or(ConstructionError::MissingRequestId)?;
                parse_request_id(&raw)?
            }
        };

        // Inbound requests never hold a peer reference.
        let peer = match direction {
            Direction::Outbound => peer,
            Direction::Inbound => None,
        };

        debug!(
            component = COMPONENT,
            request_id,
            origin = %origin,
            direction = %direction,
            entries = items.len(),
            "Shipping request created"
        );

        Ok(Self {
            request_id,
            origin,
            direction,
            peer,
            requester_id,
            items,
            created_at: Instant::now(),
            last_error: UNKNOWN_ERROR.to_string(),
            env,
        })
    }

    /// Outbound request for live items, addressed to `peer`.
    pub fn outbound(
        env: Arc<ShippingEnv>,
        peer: Arc<Peer>,
        requester_id: impl Into<String>,
        items: Vec<ItemRef>,
    ) -> Result<Self, ConstructionError> {
        Self::new(
            env,
            RequestParams {
                direction: Direction::Outbound,
                origin: Origin::local(),
                peer: Some(peer),
                requester_id: requester_id.into(),
                items: Manifest::Live(items),
                request_id: None,
            },
        )
    }

    /// Inbound request as received from `origin`.
    pub fn inbound(
        env: Arc<ShippingEnv>,
        origin: Origin,
        request_id: impl Into<String>,
        requester_id: impl Into<String>,
        items: BTreeMap<CatalogId, u32>,
    ) -> Result<Self, ConstructionError> {
        Self::new(
            env,
            RequestParams {
                direction: Direction::Inbound,
                origin,
                peer: None,
                requester_id: requester_id.into(),
                items: Manifest::Counted(items),
                request_id: Some(request_id.into()),
            },
        )
    }

    /// Request id, unique within [`Self::origin`].
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    /// Origin marker.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Transfer direction.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Target peer (outbound only).
    pub fn peer(&self) -> Option<&Arc<Peer>> {
        self.peer.as_ref()
    }

    /// Initiating user.
    pub fn requester_id(&self) -> &str {
        &self.requester_id
    }

    /// Items not yet processed.
    pub fn items(&self) -> &Manifest {
        &self.items
    }

    /// Construction time.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Most recent failure, or "unknown error".
    pub fn last_error(&self) -> &str {
        &self.last_error
    }

    /// Correlation key.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.origin.clone(), self.request_id)
    }

    /// Offer the transfer to the target peer.
    ///
    /// Unknown items and items outside the peer's allow-list are left out of
    /// the payload. If that leaves nothing, no call is made and the failure
    /// is [`ShippingError::NothingToShip`]. On acknowledgment the request
    /// moves into `pending`; items are untouched until the peer's decision
    /// arrives.
    pub async fn send(mut self, pending: &RequestIndex) -> Result<SendReport, SendFailure> {
        if let Err(error) = self.expect_direction(Direction::Outbound, "send") {
            return Err(self.into_failure(error));
        }

        let prepared = match (&self.peer, &self.items) {
            (Some(peer), Manifest::Live(items)) => {
                let mut translation = translate_items(items, &self.env.catalog);
                apply_allow_list(&mut translation, peer);
                Ok((Arc::clone(peer), translation))
            }
            (None, _) => Err(ShippingError::from(ConstructionError::MissingPeer)),
            (Some(_), items) => Err(ShippingError::from(ConstructionError::ManifestMismatch {
                direction: self.direction,
                found: items.shape(),
            })),
        };

        let (peer, translation) = match prepared {
            Ok(prepared) => prepared,
            Err(error) => {
                let error = self.record(error);
                return Err(self.into_failure(error));
            }
        };

        record_dropped("uncatalogued", translation.dropped_uncatalogued);
        record_dropped("disallowed", translation.dropped_disallowed);

        if translation.counts.is_empty() {
            let error = self.record(ShippingError::NothingToShip {
                dropped_uncatalogued: translation.dropped_uncatalogued,
                dropped_disallowed: translation.dropped_disallowed,
            });
            warn!(
                component = COMPONENT,
                request_id = self.request_id,
                peer = %peer.name,
                error = %error,
                "Transfer offer not sent"
            );
            return Err(self.into_failure(error));
        }

        let payload = CallPayload::InitiateTransfer {
            requester: self.requester_id.clone(),
            request_id: self.request_id,
            items: translation.counts.clone(),
        };

        if let Err(error) = self.env.client.exchange(&peer.address, &payload).await {
            warn!(
                component = COMPONENT,
                request_id = self.request_id,
                peer = %peer.name,
                error = %error,
                "Transfer offer failed"
            );
            let error = self.record(error);
            return Err(self.into_failure(error));
        }

        let shipped_total = translation.shipped();
        let report = SendReport {
            key: self.key(),
            shipped: translation.counts,
            dropped_uncatalogued: translation.dropped_uncatalogued,
            dropped_disallowed: translation.dropped_disallowed,
        };

        if let Err(request) = pending.insert(self) {
            let mut request = *request;
            let error = request.record(ShippingError::Duplicate(request.key()));
            return Err(SendFailure { error, request: Box::new(request) });
        }

        fl_telemetry::SHIPMENTS_SENT.inc();
        info!(
            component = COMPONENT,
            request_id = report.key.request_id,
            peer = %peer.name,
            shipped = shipped_total,
            dropped_uncatalogued = report.dropped_uncatalogued,
            dropped_disallowed = report.dropped_disallowed,
            "Transfer offer acknowledged"
        );

        Ok(report)
    }

    /// The peer accepted: destroy every item still held.
    ///
    /// Returns the number of items destroyed.
    pub fn accepted_outbound(&mut self) -> Result<usize, ShippingError> {
        self.expect_direction(Direction::Outbound, "accepted_outbound")?;

        let world = Arc::clone(&self.env.world);
        let mut destroyed = 0;
        if let Manifest::Live(items) = &mut self.items {
            for item in items.drain(..) {
                world.destroy(&item);
                destroyed += 1;
            }
        }

        info!(
            component = COMPONENT,
            request_id = self.request_id,
            destroyed,
            "Outbound transfer completed"
        );
        Ok(destroyed)
    }

    /// The peer denied: move every item still held to the fallback location.
    ///
    /// Returns the number of items relocated.
    pub fn denied_outbound(&mut self) -> Result<usize, ShippingError> {
        self.expect_direction(Direction::Outbound, "denied_outbound")?;

        let world = Arc::clone(&self.env.world);
        let fallback = self.env.fallback_location;
        let mut relocated = 0;
        if let Manifest::Live(items) = &mut self.items {
            for item in items.drain(..) {
                world.relocate(&item, fallback);
                relocated += 1;
            }
        }

        info!(
            component = COMPONENT,
            request_id = self.request_id,
            relocated,
            "Outbound transfer denied, items returned"
        );
        Ok(relocated)
    }

    /// Accept an inbound transfer.
    ///
    /// The origin is told "accepted" first; items are manufactured only
    /// after that acknowledgment. A construction failure afterwards aborts
    /// the remaining items while the origin already considers the transfer
    /// accepted. Identifiers with no catalog mapping are skipped.
    ///
    /// Entries are drained from [`Self::items`] as they are processed. After
    /// an aborted manufacture `items()` holds only the identifiers not yet
    /// reached, not the original manifest; the identifier being built when
    /// construction failed is gone as well.
    pub async fn accepted_inbound(
        &mut self,
        approver_id: Option<&str>,
    ) -> Result<ManufactureReport, ShippingError> {
        self.expect_direction(Direction::Inbound, "accepted_inbound")?;
        self.reply(approver_id, true).await?;

        let env = Arc::clone(&self.env);
        let mut report = ManufactureReport::default();
        let mut failure = None;

        if let Manifest::Counted(items) = &mut self.items {
            'manifest: while let Some((id, count)) = items.pop_first() {
                let Some(kind) = env.catalog.constructible_kind(&id) else {
                    debug!(component = COMPONENT, id = %id, count, "No catalog mapping, skipping");
                    report.skipped_unmapped += 1;
                    record_dropped("unmapped", count as usize);
                    continue;
                };

                for _ in 0..count {
                    match env.world.construct(kind, env.drop_location) {
                        Ok(item) => report.constructed.push(item),
                        Err(e) => {
                            failure = Some(ShippingError::Manufacture(format!("{}: {}", id, e)));
                            break 'manifest;
                        }
                    }
                }
            }
        }

        fl_telemetry::ITEMS_MANUFACTURED.inc_by(report.constructed.len() as u64);

        if let Some(error) = failure {
            warn!(
                component = COMPONENT,
                request_id = self.request_id,
                origin = %self.origin,
                constructed = report.constructed.len(),
                error = %error,
                "Manufacture aborted after transfer was accepted"
            );
            return Err(self.record(error));
        }

        info!(
            component = COMPONENT,
            request_id = self.request_id,
            origin = %self.origin,
            constructed = report.constructed.len(),
            skipped_unmapped = report.skipped_unmapped,
            "Inbound transfer fulfilled"
        );
        Ok(report)
    }

    /// Deny an inbound transfer. Nothing was created, so nothing is rolled back.
    pub async fn denied_inbound(&mut self, approver_id: Option<&str>) -> Result<(), ShippingError> {
        self.expect_direction(Direction::Inbound, "denied_inbound")?;
        self.reply(approver_id, false).await?;

        if let Manifest::Counted(items) = &mut self.items {
            items.clear();
        }

        info!(
            component = COMPONENT,
            request_id = self.request_id,
            origin = %self.origin,
            "Inbound transfer denied"
        );
        Ok(())
    }

    async fn reply(&mut self, approver_id: Option<&str>, accept: bool) -> Result<(), ShippingError> {
        let approver = approver_id
            .filter(|a| !a.trim().is_empty())
            .unwrap_or(DEFAULT_APPROVER);

        let payload = CallPayload::TransferReply {
            approver: approver.to_string(),
            accept,
            request_id: self.request_id,
        };

        match self.env.client.exchange(self.origin.as_str(), &payload).await {
            Ok(_) => Ok(()),
            Err(error) => {
                warn!(
                    component = COMPONENT,
                    request_id = self.request_id,
                    origin = %self.origin,
                    accept,
                    error = %error,
                    "Transfer reply failed"
                );
                Err(self.record(error))
            }
        }
    }

    fn expect_direction(
        &mut self,
        direction: Direction,
        operation: &'static str,
    ) -> Result<(), ShippingError> {
        if self.direction != direction {
            return Err(self.record(ShippingError::WrongDirection {
                operation,
                direction: self.direction,
            }));
        }
        Ok(())
    }

    fn record(&mut self, error: ShippingError) -> ShippingError {
        self.last_error = error.to_string();
        error
    }

    fn into_failure(self, error: ShippingError) -> SendFailure {
        SendFailure {
            error,
            request: Box::new(self),
        }
    }
}

impl fmt::Debug for ShippingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShippingRequest")
            .field("request_id", &self.request_id)
            .field("origin", &self.origin)
            .field("direction", &self.direction)
            .field("peer", &self.peer.as_ref().map(|p| p.name.as_str()))
            .field("requester_id", &self.requester_id)
            .field("items", &self.items)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

fn record_dropped(reason: &str, count: usize) {
    if count > 0 {
        fl_telemetry::ITEMS_DROPPED
            .with_label_values(&[reason])
            .inc_by(count as u64);
    }
}
