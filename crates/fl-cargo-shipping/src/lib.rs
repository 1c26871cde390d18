//! # FreightLine Cargo Shipping
//!
//! Transfer of in-game items between independently running game-world
//! servers over a two-step request/reply protocol.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Protocol
//!
//! 1. The sending node offers a transfer (`initiate-transfer`) carrying a
//!    canonical identifier to count map. Items stay in place.
//! 2. The receiving node queues the offer until someone decides.
//! 3. The decision is answered with `transfer-reply`. On accept the sender
//!    destroys its items and the receiver manufactures equivalents at its
//!    drop location; on deny the sender moves its items to the fallback
//!    location.
//!
//! Every call carries a shared auth token. Replies are status documents
//! `{"statusCode": .., "response": ..}` where only 200 succeeds.
//!
//! ## Module Structure
//!
//! ```text
//! fl-cargo-shipping/
//! ├── domain/          # ShippingRequest, catalog, peers, index, errors
//! ├── algorithms/      # Request id sequence, manifest translation, exchange
//! ├── ports/           # ShippingApi, CallHandler, RemoteTransport, ObjectLifecycle
//! ├── adapters/        # HTTP transport + call server, loopback, in-memory world, TOML config
//! ├── service.rs       # ShippingService node façade
//! └── main.rs          # freightline-node binary
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(test)]
mod test_utils;

// Re-exports
pub use adapters::{
    call_router, HttpCallServer, HttpTransport, InMemoryWorld, LoopbackNetwork,
    LoopbackTransport, StaticConfigProvider, TomlConfigProvider, ORIGIN_HEADER, SHIPPING_PATH,
};
pub use algorithms::{
    evaluate_reply, next_request_id, CallPayload, RemoteReply, TransportClient,
    CALL_INITIATE_TRANSFER, CALL_TRANSFER_REPLY, DEFAULT_APPROVER,
};
pub use domain::{
    CatalogId, ConfigError, ConstructionError, Direction, ItemCatalog, ItemRef, LocalKind,
    Location, ManufactureReport, Manifest, Origin, Peer, PeerRegistry, RequestIndex, RequestKey,
    RequestParams, SendFailure, SendReport, ShippingConfig, ShippingEnv, ShippingError,
    ShippingRequest, WorldError, DEFAULT_AUTH_TOKEN, LOCAL_ORIGIN, UNKNOWN_ERROR,
};
pub use ports::{
    CallHandler, ConfigProvider, MockTransport, ObjectLifecycle, RecordedCall, RemoteTransport,
    ShippingApi,
};
pub use service::ShippingService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
