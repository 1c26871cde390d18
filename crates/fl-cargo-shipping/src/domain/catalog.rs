//! # Item Catalog
//!
//! Translation between local object types and canonical item identifiers.
//! Built once at startup and read-only afterwards.

use super::value_objects::{CatalogId, LocalKind};
use std::collections::HashMap;

/// Two-way lookup between [`LocalKind`] and [`CatalogId`].
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    to_canonical: HashMap<LocalKind, CatalogId>,
    to_local: HashMap<CatalogId, LocalKind>,
}

impl ItemCatalog {
    /// Build a catalog from `(local kind, canonical id)` pairs.
    ///
    /// Several local kinds may share one canonical id; the first one
    /// registered is the kind manufactured for that id. A local kind
    /// registered twice keeps its first mapping.
    pub fn new(entries: impl IntoIterator<Item = (LocalKind, CatalogId)>) -> Self {
        let mut to_canonical = HashMap::new();
        let mut to_local = HashMap::new();

        for (kind, id) in entries {
            to_local.entry(id.clone()).or_insert_with(|| kind.clone());
            to_canonical.entry(kind).or_insert(id);
        }

        Self {
            to_canonical,
            to_local,
        }
    }

    /// Canonical identifier for a local kind.
    pub fn canonical_id(&self, kind: &LocalKind) -> Option<&CatalogId> {
        self.to_canonical.get(kind)
    }

    /// Local kind to construct for a canonical identifier.
    pub fn constructible_kind(&self, id: &CatalogId) -> Option<&LocalKind> {
        self.to_local.get(id)
    }

    /// Number of registered local kinds.
    pub fn len(&self) -> usize {
        self.to_canonical.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.to_canonical.is_empty()
    }
}
