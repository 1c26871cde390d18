//! # Manifest Translation
//!
//! Turns live item references into the identifier/count payload a peer
//! receives. Unknown and disallowed items are dropped silently; the counts
//! are kept for diagnostics only.

use crate::domain::{CatalogId, ItemCatalog, ItemRef, Peer};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of translating live items for one peer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Translation {
    /// Identifier to instance count, as transmitted.
    pub counts: BTreeMap<CatalogId, u32>,
    /// Instances with no catalog entry.
    pub dropped_uncatalogued: usize,
    /// Instances outside the peer's allow-list.
    pub dropped_disallowed: usize,
}

impl Translation {
    /// Total instances in the payload.
    pub fn shipped(&self) -> u64 {
        self.counts.values().map(|c| u64::from(*c)).sum()
    }
}

/// Map each live item to its canonical id and count instances per id.
pub fn translate_items(items: &[ItemRef], catalog: &ItemCatalog) -> Translation {
    let mut translation = Translation::default();

    for item in items {
        match catalog.canonical_id(&item.kind) {
            Some(id) => {
                let count = translation.counts.entry(id.clone()).or_insert(0);
                *count = count.saturating_add(1);
            }
            None => {
                debug!(object_id = item.object_id, kind = %item.kind, "No catalog entry, dropping item");
                translation.dropped_uncatalogued += 1;
            }
        }
    }

    translation
}

/// Remove identifiers the peer does not accept.
pub fn apply_allow_list(translation: &mut Translation, peer: &Peer) {
    if !peer.is_restricted() {
        return;
    }

    let mut dropped = 0usize;
    translation.counts.retain(|id, count| {
        let keep = peer.accepts(id);
        if !keep {
            debug!(peer = %peer.name, id = %id, count = *count, "Not on allow-list, dropping");
            dropped += *count as usize;
        }
        keep
    });
    translation.dropped_disallowed += dropped;
}
