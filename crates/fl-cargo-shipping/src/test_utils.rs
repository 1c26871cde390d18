//! Shared fixtures for unit tests.

use crate::adapters::InMemoryWorld;
use crate::domain::{
    CatalogId, ItemCatalog, LocalKind, Location, Peer, ShippingConfig, ShippingEnv,
};
use crate::ports::outbound::MockTransport;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Drop location used by [`test_env`].
pub const DROP: Location = Location::new(10.0, 64.0, -10.0);
/// Fallback location used by [`test_env`].
pub const FALLBACK: Location = Location::new(0.0, 70.0, 0.0);

/// Catalog with `iron_ore -> ore_sample` and `oak_log -> timber`.
pub fn test_catalog() -> ItemCatalog {
    ItemCatalog::new([
        (LocalKind::new("iron_ore"), CatalogId::new("ore_sample")),
        (LocalKind::new("oak_log"), CatalogId::new("timber")),
    ])
}

/// Config with the test locations and token.
pub fn test_config() -> ShippingConfig {
    ShippingConfig {
        auth_token: "test-token".to_string(),
        drop_location: DROP,
        fallback_location: FALLBACK,
        ..ShippingConfig::default()
    }
}

/// Unrestricted peer `north`.
pub fn test_peer() -> Arc<Peer> {
    Arc::new(Peer::new("north", "http://north:8080"))
}

/// Environment over a mock transport and an in-memory world.
pub fn test_env(
    transport: MockTransport,
) -> (Arc<ShippingEnv>, Arc<MockTransport>, Arc<InMemoryWorld>) {
    let transport = Arc::new(transport);
    let world = Arc::new(InMemoryWorld::new());
    let env = ShippingEnv::new(
        &test_config(),
        Arc::new(test_catalog()),
        transport.clone(),
        world.clone(),
    );
    (Arc::new(env), transport, world)
}

/// Identifier/count map from literals.
pub fn counted(entries: &[(&str, u32)]) -> BTreeMap<CatalogId, u32> {
    entries
        .iter()
        .map(|(id, count)| (CatalogId::new(*id), *count))
        .collect()
}
