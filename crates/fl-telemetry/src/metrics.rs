//! Prometheus metrics for shipping nodes.
//!
//! All metrics follow the naming convention: `fl_shipping_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    /// Outbound transfers acknowledged by the receiving peer
    pub static ref SHIPMENTS_SENT: IntCounter = IntCounter::new(
        "fl_shipping_shipments_sent_total",
        "Total outbound transfers acknowledged by a peer"
    ).expect("metric creation failed");

    /// Failed remote calls, by call type and failure kind
    pub static ref PROTOCOL_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("fl_shipping_protocol_failures_total", "Failed remote calls"),
        &["call", "kind"]  // kind: no_response/malformed/rejected
    ).expect("metric creation failed");

    /// Item instances left out of a transfer, by reason
    pub static ref ITEMS_DROPPED: IntCounterVec = IntCounterVec::new(
        Opts::new("fl_shipping_items_dropped_total", "Item instances silently left out of a transfer"),
        &["reason"]  // reason: uncatalogued/disallowed/unmapped
    ).expect("metric creation failed");

    /// Item instances constructed on the receiving side
    pub static ref ITEMS_MANUFACTURED: IntCounter = IntCounter::new(
        "fl_shipping_items_manufactured_total",
        "Total item instances constructed for accepted inbound transfers"
    ).expect("metric creation failed");

    /// Inbound remote calls handled, by call type and status code
    pub static ref CALLS_HANDLED: IntCounterVec = IntCounterVec::new(
        Opts::new("fl_shipping_calls_handled_total", "Inbound remote calls handled"),
        &["call", "status"]
    ).expect("metric creation failed");
}

/// Handle to the registered metrics.
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all shipping metrics with the global registry.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SHIPMENTS_SENT.clone()),
        Box::new(PROTOCOL_FAILURES.clone()),
        Box::new(ITEMS_DROPPED.clone()),
        Box::new(ITEMS_MANUFACTURED.clone()),
        Box::new(CALLS_HANDLED.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
