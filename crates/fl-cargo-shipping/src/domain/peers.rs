//! # Peer Registry
//!
//! Remote servers this node can ship to, keyed by name.

use super::value_objects::CatalogId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A remote shipping server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Registry name.
    pub name: String,
    /// Network address remote calls are sent to.
    pub address: String,
    /// Identifiers this peer accepts. Absent or empty accepts everything.
    #[serde(default)]
    pub allow: Option<BTreeSet<CatalogId>>,
}

impl Peer {
    /// Peer without an allow-list.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            allow: None,
        }
    }

    /// Restrict the peer to the given identifiers.
    pub fn with_allow_list(mut self, allow: impl IntoIterator<Item = CatalogId>) -> Self {
        self.allow = Some(allow.into_iter().collect());
        self
    }

    /// Whether the peer accepts this identifier.
    pub fn accepts(&self, id: &CatalogId) -> bool {
        match &self.allow {
            Some(allow) if !allow.is_empty() => allow.contains(id),
            _ => true,
        }
    }

    /// Whether the peer declares a non-empty allow-list.
    pub fn is_restricted(&self) -> bool {
        self.allow.as_ref().is_some_and(|allow| !allow.is_empty())
    }
}

/// Read-only set of peers.
#[derive(Clone, Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<String, Arc<Peer>>,
}

impl PeerRegistry {
    /// Build a registry. A later peer with a duplicate name replaces the earlier one.
    pub fn new(peers: impl IntoIterator<Item = Peer>) -> Self {
        Self {
            peers: peers
                .into_iter()
                .map(|peer| (peer.name.clone(), Arc::new(peer)))
                .collect(),
        }
    }

    /// Peer by name.
    pub fn get(&self, name: &str) -> Option<Arc<Peer>> {
        self.peers.get(name).cloned()
    }

    /// Peer by network address.
    pub fn by_address(&self, address: &str) -> Option<Arc<Peer>> {
        self.peers
            .values()
            .find(|peer| peer.address == address)
            .cloned()
    }

    /// All peers, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Peer>> {
        self.peers.values()
    }

    /// Number of peers.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}
