//! Loopback Transport Adapter
//!
//! Routes remote calls to in-process handlers by address. Lets several
//! shipping nodes run in one process (tests, single-host setups).

use crate::ports::inbound::CallHandler;
use crate::ports::outbound::RemoteTransport;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use tracing::debug;

/// Address-to-handler routing table.
#[derive(Default)]
pub struct LoopbackNetwork {
    routes: RwLock<HashMap<String, Weak<dyn CallHandler>>>,
}

impl LoopbackNetwork {
    /// Create an empty network.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Route calls for `address` to `handler`.
    ///
    /// Only a weak reference is kept; a dropped handler stops answering.
    pub fn register<H: CallHandler + 'static>(&self, address: impl Into<String>, handler: &Arc<H>) {
        let handler: Arc<dyn CallHandler> = handler.clone();
        self.routes
            .write()
            .insert(address.into(), Arc::downgrade(&handler));
    }

    /// Stop routing calls for `address`.
    pub fn unregister(&self, address: &str) {
        self.routes.write().remove(address);
    }

    /// Transport for a node reachable at `caller_address`.
    pub fn endpoint(self: &Arc<Self>, caller_address: impl Into<String>) -> LoopbackTransport {
        LoopbackTransport {
            network: Arc::clone(self),
            caller_address: caller_address.into(),
        }
    }

    fn handler(&self, address: &str) -> Option<Arc<dyn CallHandler>> {
        self.routes.read().get(address).and_then(Weak::upgrade)
    }
}

/// One node's view of a [`LoopbackNetwork`].
#[derive(Clone)]
pub struct LoopbackTransport {
    network: Arc<LoopbackNetwork>,
    caller_address: String,
}

impl LoopbackTransport {
    /// Address this endpoint calls from.
    pub fn caller_address(&self) -> &str {
        &self.caller_address
    }
}

#[async_trait]
impl RemoteTransport for LoopbackTransport {
    async fn call(&self, address: &str, params: &[(String, String)]) -> Option<String> {
        let Some(handler) = self.network.handler(address) else {
            debug!(address, "No loopback route");
            return None;
        };

        let params: HashMap<String, String> = params.iter().cloned().collect();
        let reply = handler.handle_call(&self.caller_address, &params);
        reply.to_json().ok()
    }
}
