//! # Domain Invariants
//!
//! Construction rules for shipping requests. A request either satisfies all
//! of them or is never created.

use super::errors::ConstructionError;
use super::peers::Peer;
use super::value_objects::{Direction, Manifest, Origin};

/// Invariant: a request names the user who initiated it.
pub fn invariant_requester_present(requester_id: &str) -> Result<(), ConstructionError> {
    if requester_id.trim().is_empty() {
        return Err(ConstructionError::EmptyRequester);
    }
    Ok(())
}

/// Invariant: the manifest is non-empty, has the shape of its direction,
/// and every inbound count is positive.
pub fn invariant_manifest_valid(
    direction: Direction,
    items: &Manifest,
) -> Result<(), ConstructionError> {
    if items.expected_direction() != direction {
        return Err(ConstructionError::ManifestMismatch {
            direction,
            found: items.shape(),
        });
    }
    if items.is_empty() {
        return Err(ConstructionError::EmptyManifest);
    }
    if let Manifest::Counted(counts) = items {
        if let Some((id, _)) = counts.iter().find(|(_, count)| **count == 0) {
            return Err(ConstructionError::NonPositiveCount(id.clone()));
        }
    }
    Ok(())
}

/// Invariant: origin is "local" if and only if the request is outbound.
pub fn invariant_origin_matches(
    origin: &Origin,
    direction: Direction,
) -> Result<(), ConstructionError> {
    let consistent = match direction {
        Direction::Outbound => origin.is_local(),
        Direction::Inbound => !origin.is_local() && !origin.as_str().is_empty(),
    };
    if !consistent {
        return Err(ConstructionError::OriginMismatch {
            origin: origin.clone(),
            direction,
        });
    }
    Ok(())
}

/// Invariant: outbound requests have a target peer.
pub fn invariant_peer_present(
    direction: Direction,
    peer: Option<&Peer>,
) -> Result<(), ConstructionError> {
    if direction == Direction::Outbound && peer.is_none() {
        return Err(ConstructionError::MissingPeer);
    }
    Ok(())
}

/// Parse an inbound request id: ASCII digits only, fitting in a `u64`.
pub fn parse_request_id(raw: &str) -> Result<u64, ConstructionError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ConstructionError::MalformedRequestId(raw.to_string()));
    }
    raw.parse::<u64>()
        .map_err(|_| ConstructionError::MalformedRequestId(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{CatalogId, ItemRef};
    use std::collections::BTreeMap;

    #[test]
    fn test_requester_present() {
        assert!(invariant_requester_present("alice").is_ok());
        assert_eq!(
            invariant_requester_present(""),
            Err(ConstructionError::EmptyRequester)
        );
        assert!(invariant_requester_present("   ").is_err());
    }

    #[test]
    fn test_manifest_shape_mismatch() {
        let items = Manifest::Live(vec![ItemRef::new(1, "iron_ore")]);
        assert!(matches!(
            invariant_manifest_valid(Direction::Inbound, &items),
            Err(ConstructionError::ManifestMismatch { .. })
        ));
    }

    #[test]
    fn test_manifest_empty() {
        assert_eq!(
            invariant_manifest_valid(Direction::Outbound, &Manifest::Live(vec![])),
            Err(ConstructionError::EmptyManifest)
        );
    }

    #[test]
    fn test_manifest_zero_count() {
        let mut counts = BTreeMap::new();
        counts.insert(CatalogId::new("ore_sample"), 0);
        assert_eq!(
            invariant_manifest_valid(Direction::Inbound, &Manifest::Counted(counts)),
            Err(ConstructionError::NonPositiveCount(CatalogId::new("ore_sample")))
        );
    }

    #[test]
    fn test_origin_direction_consistency() {
        assert!(invariant_origin_matches(&Origin::local(), Direction::Outbound).is_ok());
        assert!(invariant_origin_matches(&Origin::new("http://peer"), Direction::Inbound).is_ok());
        assert!(invariant_origin_matches(&Origin::new("http://peer"), Direction::Outbound).is_err());
        assert!(invariant_origin_matches(&Origin::local(), Direction::Inbound).is_err());
        assert!(invariant_origin_matches(&Origin::new(""), Direction::Inbound).is_err());
    }

    #[test]
    fn test_peer_required_for_outbound() {
        assert_eq!(
            invariant_peer_present(Direction::Outbound, None),
            Err(ConstructionError::MissingPeer)
        );
        assert!(invariant_peer_present(Direction::Inbound, None).is_ok());
    }

    #[test]
    fn test_parse_request_id() {
        assert_eq!(parse_request_id("0"), Ok(0));
        assert_eq!(parse_request_id("1234"), Ok(1234));
        assert!(parse_request_id("").is_err());
        assert!(parse_request_id("-1").is_err());
        assert!(parse_request_id("+5").is_err());
        assert!(parse_request_id("12a").is_err());
        assert!(parse_request_id(" 7").is_err());
        assert!(parse_request_id("99999999999999999999999").is_err());
    }
}
