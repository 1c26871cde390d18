//! Two shipping nodes talking over an in-process loopback network.

use fl_cargo_shipping::{
    CatalogId, InMemoryWorld, ItemRef, Location, LoopbackNetwork, Origin, Peer, RequestKey,
    ShippingApi, ShippingConfig, ShippingError, ShippingService, StaticConfigProvider,
};
use std::sync::Arc;

const NODE_A: &str = "loop://node-a";
const NODE_B: &str = "loop://node-b";
const B_DROP: Location = Location::new(5.0, 64.0, 5.0);
const A_FALLBACK: Location = Location::new(-1.0, 80.0, -1.0);

struct Node {
    service: Arc<ShippingService>,
    world: Arc<InMemoryWorld>,
}

fn config(token: &str) -> ShippingConfig {
    ShippingConfig {
        auth_token: token.to_string(),
        drop_location: B_DROP,
        fallback_location: A_FALLBACK,
        ..ShippingConfig::default()
    }
}

fn node(network: &Arc<LoopbackNetwork>, address: &str, provider: StaticConfigProvider) -> Node {
    let world = Arc::new(InMemoryWorld::new());
    let service = Arc::new(ShippingService::from_provider(
        &provider,
        Arc::new(network.endpoint(address)),
        world.clone(),
    ));
    network.register(address, &service);
    Node { service, world }
}

/// Node A names its goods `iron_ore`/`oak_log`, node B `raw_iron`/`log`.
fn pair(a_token: &str, b_token: &str, peer_b: Peer) -> (Node, Node) {
    let network = LoopbackNetwork::new();
    let a = node(
        &network,
        NODE_A,
        StaticConfigProvider::new()
            .with_config(config(a_token))
            .with_catalog_entry("iron_ore", "ore_sample")
            .with_catalog_entry("oak_log", "timber")
            .with_peer(peer_b),
    );
    let b = node(
        &network,
        NODE_B,
        StaticConfigProvider::new()
            .with_config(config(b_token))
            .with_catalog_entry("raw_iron", "ore_sample")
            .with_catalog_entry("log", "timber")
            .with_peer(Peer::new("a", NODE_A)),
    );
    (a, b)
}

fn goods(world: &InMemoryWorld) -> Vec<ItemRef> {
    vec![
        world.spawn("iron_ore"),
        world.spawn("iron_ore"),
        world.spawn("oak_log"),
    ]
}

#[tokio::test]
async fn test_accepted_transfer_moves_goods() {
    let (a, b) = pair("shared", "shared", Peer::new("b", NODE_B));
    let items = goods(&a.world);

    let request = a.service.create_outbound("b", "alice", items.clone()).unwrap();
    let report = a.service.send(request).await.unwrap();

    assert_eq!(report.shipped.get(&CatalogId::new("ore_sample")), Some(&2));
    assert_eq!(report.shipped.get(&CatalogId::new("timber")), Some(&1));
    // Nothing moves before the decision.
    assert_eq!(a.world.len(), 3);
    assert_eq!(a.service.pending_outbound(), vec![report.key.clone()]);

    let inbound_key = RequestKey::new(Origin::new(NODE_A), report.key.request_id);
    assert_eq!(b.service.queued_inbound(), vec![inbound_key.clone()]);

    let manufactured = b.service.accept_inbound(&inbound_key, Some("bob")).await.unwrap();

    assert_eq!(manufactured.constructed.len(), 3);
    assert_eq!(b.world.count_of("raw_iron"), 2);
    assert_eq!(b.world.count_of("log"), 1);
    assert!(manufactured
        .constructed
        .iter()
        .all(|item| b.world.location_of(item.object_id) == Some(B_DROP)));

    assert!(a.world.is_empty());
    assert!(items.iter().all(|item| !a.world.contains(item.object_id)));
    assert!(a.service.pending_outbound().is_empty());
    assert!(b.service.queued_inbound().is_empty());
}

#[tokio::test]
async fn test_denied_transfer_returns_goods() {
    let (a, b) = pair("shared", "shared", Peer::new("b", NODE_B));
    let items = goods(&a.world);

    let request = a.service.create_outbound("b", "alice", items.clone()).unwrap();
    let report = a.service.send(request).await.unwrap();
    let inbound_key = RequestKey::new(Origin::new(NODE_A), report.key.request_id);

    b.service.deny_inbound(&inbound_key, None).await.unwrap();

    assert!(b.world.is_empty());
    assert_eq!(a.world.len(), 3);
    assert!(items
        .iter()
        .all(|item| a.world.location_of(item.object_id) == Some(A_FALLBACK)));
    assert!(a.service.pending_outbound().is_empty());
    assert!(b.service.queued_inbound().is_empty());
}

#[test]
fn test_token_mismatch_rejected() {
    let (a, b) = pair("alpha", "beta", Peer::new("b", NODE_B));
    let items = goods(&a.world);

    let request = a.service.create_outbound("b", "alice", items).unwrap();
    let failure = tokio_test::block_on(a.service.send(request)).unwrap_err();

    assert_eq!(
        failure.error,
        ShippingError::Rejected {
            status: 403,
            message: "auth rejected".to_string()
        }
    );
    assert!(failure.request.last_error().contains("auth rejected"));
    assert_eq!(failure.request.items().len(), 3);
    assert!(a.service.pending_outbound().is_empty());
    assert!(b.service.queued_inbound().is_empty());
    assert_eq!(a.world.len(), 3);
}

#[tokio::test]
async fn test_allow_list_filters_offer() {
    let peer_b = Peer::new("b", NODE_B).with_allow_list([CatalogId::new("timber")]);
    let (a, b) = pair("shared", "shared", peer_b);
    let items = goods(&a.world);

    let request = a.service.create_outbound("b", "alice", items).unwrap();
    let report = a.service.send(request).await.unwrap();
    assert_eq!(report.dropped_disallowed, 2);

    let inbound_key = RequestKey::new(Origin::new(NODE_A), report.key.request_id);
    let manufactured = b.service.accept_inbound(&inbound_key, None).await.unwrap();

    assert_eq!(manufactured.constructed.len(), 1);
    assert_eq!(b.world.count_of("log"), 1);
    assert_eq!(b.world.count_of("raw_iron"), 0);
}

#[tokio::test]
async fn test_fully_filtered_offer_stays_local() {
    let peer_b = Peer::new("b", NODE_B).with_allow_list([CatalogId::new("gold")]);
    let (a, b) = pair("shared", "shared", peer_b);
    let items = goods(&a.world);

    let request = a.service.create_outbound("b", "alice", items.clone()).unwrap();
    let failure = a.service.send(request).await.unwrap_err();

    assert!(matches!(
        failure.error,
        ShippingError::NothingToShip {
            dropped_uncatalogued: 0,
            dropped_disallowed: 3
        }
    ));
    assert!(b.service.queued_inbound().is_empty());
    assert!(a.service.pending_outbound().is_empty());
    assert!(items.iter().all(|item| a.world.contains(item.object_id)));
}

#[tokio::test]
async fn test_reply_after_origin_forgot_request() {
    let (a, b) = pair("shared", "shared", Peer::new("b", NODE_B));
    let items = goods(&a.world);

    let request = a.service.create_outbound("b", "alice", items).unwrap();
    let report = a.service.send(request).await.unwrap();
    a.service.outbound_index().remove(&report.key).unwrap();

    let inbound_key = RequestKey::new(Origin::new(NODE_A), report.key.request_id);
    let err = b.service.accept_inbound(&inbound_key, None).await.unwrap_err();

    assert!(matches!(err, ShippingError::Rejected { status: 404, .. }));
    // Nothing built; the decision can be retried.
    assert!(b.world.is_empty());
    assert_eq!(b.service.queued_inbound(), vec![inbound_key]);
}
