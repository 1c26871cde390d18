//! # Domain Value Objects
//!
//! Immutable value types for cargo shipping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Origin marker for requests created on this server.
pub const LOCAL_ORIGIN: &str = "local";

/// Canonical, transport-safe item type identifier shared by all servers.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogId(String);

impl CatalogId {
    /// Create a catalog identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CatalogId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Server-local object type, as understood by the world collaborator.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalKind(String);

impl LocalKind {
    /// Create a local kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// Borrow the kind name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LocalKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

/// Reference to a live item instance in the game world.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemRef {
    /// World object id.
    pub object_id: u64,
    /// Local object type.
    pub kind: LocalKind,
}

impl ItemRef {
    /// Create an item reference.
    pub fn new(object_id: u64, kind: impl Into<LocalKind>) -> Self {
        Self {
            object_id,
            kind: kind.into(),
        }
    }
}

/// A point in the game world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Location {
    /// Create a location.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Transfer direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// This server sends items away.
    Outbound,
    /// A peer sends items to this server.
    Inbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Outbound => f.write_str("outbound"),
            Direction::Inbound => f.write_str("inbound"),
        }
    }
}

/// Server that created a logical transfer: [`LOCAL_ORIGIN`] or a peer address.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    /// The local sentinel origin.
    pub fn local() -> Self {
        Self(LOCAL_ORIGIN.to_string())
    }

    /// Origin from a marker received over the wire or from configuration.
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }

    /// Whether this is the local sentinel.
    pub fn is_local(&self) -> bool {
        self.0 == LOCAL_ORIGIN
    }

    /// Borrow the marker (network address for remote origins).
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Items carried by a request.
///
/// Outbound requests carry live item references; inbound requests carry
/// canonical identifiers with counts.
#[derive(Clone, Debug, PartialEq)]
pub enum Manifest {
    /// Live item instances on this server.
    Live(Vec<ItemRef>),
    /// Canonical identifier to positive count.
    Counted(BTreeMap<CatalogId, u32>),
}

impl Manifest {
    /// Whether no items remain.
    pub fn is_empty(&self) -> bool {
        match self {
            Manifest::Live(items) => items.is_empty(),
            Manifest::Counted(counts) => counts.is_empty(),
        }
    }

    /// Number of entries (item references or identifiers).
    pub fn len(&self) -> usize {
        match self {
            Manifest::Live(items) => items.len(),
            Manifest::Counted(counts) => counts.len(),
        }
    }

    /// Short name of the manifest shape.
    pub fn shape(&self) -> &'static str {
        match self {
            Manifest::Live(_) => "live item",
            Manifest::Counted(_) => "counted item",
        }
    }

    /// Direction this manifest shape belongs to.
    pub fn expected_direction(&self) -> Direction {
        match self {
            Manifest::Live(_) => Direction::Outbound,
            Manifest::Counted(_) => Direction::Inbound,
        }
    }
}

/// Correlation key: origin marker plus request id.
///
/// Request ids are only unique within one origin.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    /// Origin marker.
    pub origin: Origin,
    /// Request id within that origin.
    pub request_id: u64,
}

impl RequestKey {
    /// Create a key.
    pub fn new(origin: Origin, request_id: u64) -> Self {
        Self { origin, request_id }
    }

    /// Key for a request that originated here.
    pub fn local(request_id: u64) -> Self {
        Self::new(Origin::local(), request_id)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.origin, self.request_id)
    }
}
