//! # Domain Errors
//!
//! Error types for cargo shipping.

use super::value_objects::{CatalogId, Direction, LocalKind, Origin, RequestKey};
use thiserror::Error;

/// Diagnostic held by a request before anything has gone wrong.
pub const UNKNOWN_ERROR: &str = "unknown error";

/// Invalid input at request construction. No request is produced.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// Requester identifier is empty.
    #[error("requester id must not be empty")]
    EmptyRequester,

    /// Item payload is empty.
    #[error("item manifest must not be empty")]
    EmptyManifest,

    /// Manifest shape does not match the direction.
    #[error("{direction} request cannot carry a {found} manifest")]
    ManifestMismatch {
        /// Requested direction
        direction: Direction,
        /// Shape that was supplied
        found: &'static str,
    },

    /// Inbound item count is zero.
    #[error("item count for {0} must be positive")]
    NonPositiveCount(CatalogId),

    /// Origin is "local" for an inbound request, or not "local" for an outbound one.
    #[error("origin {origin} is inconsistent with {direction} direction")]
    OriginMismatch {
        /// Supplied origin
        origin: Origin,
        /// Requested direction
        direction: Direction,
    },

    /// Outbound request without a target peer.
    #[error("outbound request requires a target peer")]
    MissingPeer,

    /// Inbound request without a request id.
    #[error("inbound request requires a request id")]
    MissingRequestId,

    /// Inbound request id is not a non-negative integer.
    #[error("request id {0:?} is not a non-negative integer")]
    MalformedRequestId(String),
}

/// Shipping error types.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ShippingError {
    /// Request could not be constructed.
    #[error("construction failed: {0}")]
    Construction(#[from] ConstructionError),

    /// Remote call produced no response.
    #[error("no response received")]
    NoResponse,

    /// Remote answered with something other than a status document.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Remote answered with a non-success status.
    #[error("remote rejected request (status {status}): {message}")]
    Rejected {
        /// Reported status code
        status: i64,
        /// Reported message
        message: String,
    },

    /// Operation invoked on a request of the wrong direction.
    #[error("{operation} is not valid for {direction} requests")]
    WrongDirection {
        /// Operation name
        operation: &'static str,
        /// Direction of the request it was invoked on
        direction: Direction,
    },

    /// Item construction failed after the transfer was acknowledged.
    #[error("manufacture failed: {0}")]
    Manufacture(String),

    /// Call payload could not be encoded.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Catalog and allow-list filtering left nothing to offer.
    #[error(
        "nothing left to ship: {dropped_uncatalogued} uncatalogued and \
         {dropped_disallowed} disallowed item(s) dropped"
    )]
    NothingToShip {
        /// Instances without a catalog entry
        dropped_uncatalogued: usize,
        /// Instances outside the peer's allow-list
        dropped_disallowed: usize,
    },

    /// Incoming call carried the wrong auth token.
    #[error("auth rejected")]
    Unauthorized,

    /// No peer registered under this name.
    #[error("unknown peer: {0}")]
    UnknownPeer(String),

    /// No request held under this key.
    #[error("request not found: {0}")]
    NotFound(RequestKey),

    /// A request is already held under this key.
    #[error("request already queued: {0}")]
    Duplicate(RequestKey),
}

impl ShippingError {
    /// Whether this is a failure of the remote call itself.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::NoResponse | Self::MalformedResponse(_) | Self::Rejected { .. }
        )
    }

    /// Metric label for protocol failures.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::NoResponse => "no_response",
            Self::MalformedResponse(_) => "malformed",
            Self::Rejected { .. } => "rejected",
            _ => "other",
        }
    }
}

/// Failures reported by the world object collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The world cannot construct this kind.
    #[error("unknown object kind: {0}")]
    UnknownKind(LocalKind),
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is present but unusable.
    #[error("invalid config value: {0}")]
    Invalid(String),
}
