//! # Request Index
//!
//! Requests held between protocol steps, keyed by (origin, request id).
//! Used for the pending outbound index and for the inbound decision queue.

use super::entities::ShippingRequest;
use super::value_objects::RequestKey;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Thread-safe map from [`RequestKey`] to a held request.
#[derive(Default)]
pub struct RequestIndex {
    entries: RwLock<HashMap<RequestKey, ShippingRequest>>,
}

impl RequestIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold a request under its own key.
    ///
    /// Hands the request back if the key is already taken.
    pub fn insert(&self, request: ShippingRequest) -> Result<RequestKey, Box<ShippingRequest>> {
        let key = request.key();
        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return Err(Box::new(request));
        }
        entries.insert(key.clone(), request);
        Ok(key)
    }

    /// Take a request out of the index.
    pub fn remove(&self, key: &RequestKey) -> Option<ShippingRequest> {
        self.entries.write().remove(key)
    }

    /// Whether a request is held under `key`.
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.entries.read().contains_key(key)
    }

    /// Keys currently held.
    pub fn keys(&self) -> Vec<RequestKey> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of held requests.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl std::fmt::Debug for RequestIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestIndex")
            .field("len", &self.len())
            .finish()
    }
}
