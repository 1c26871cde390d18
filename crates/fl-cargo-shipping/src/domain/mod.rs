//! # Domain Module
//!
//! Core domain types for cargo shipping.

pub mod catalog;
pub mod config;
pub mod entities;
pub mod errors;
pub mod index;
pub mod invariants;
pub mod peers;
pub mod value_objects;

pub use catalog::ItemCatalog;
pub use config::{ShippingConfig, DEFAULT_AUTH_TOKEN};
pub use entities::*;
pub use errors::*;
pub use index::RequestIndex;
pub use invariants::*;
pub use peers::{Peer, PeerRegistry};
pub use value_objects::*;
