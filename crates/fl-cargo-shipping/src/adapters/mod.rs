//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the port traits: HTTP and loopback transports, the HTTP call
//! server, the in-memory world, and configuration providers.

mod config;
mod http_server;
mod http_transport;
mod loopback;
mod world;

pub use config::{StaticConfigProvider, TomlConfigProvider, AUTH_TOKEN_ENV};
pub use http_server::{call_router, HttpCallServer, SHIPPING_PATH};
pub use http_transport::{HttpTransport, ORIGIN_HEADER};
pub use loopback::{LoopbackNetwork, LoopbackTransport};
pub use world::InMemoryWorld;
