//! Process-wide telemetry installation.
//!
//! Kept to a single test: the subscriber and registry are global, so a
//! second installation in the same process is expected to fail.

use fl_telemetry::{encode_metrics, init_telemetry, TelemetryConfig, TelemetryError, SHIPMENTS_SENT};

#[test]
fn test_init_telemetry_installs_once() {
    let config = TelemetryConfig {
        console_output: false,
        ..TelemetryConfig::default()
    };

    let guard = init_telemetry(config.clone()).unwrap();
    SHIPMENTS_SENT.inc();
    let text = encode_metrics().unwrap();
    assert!(text.contains("fl_shipping_shipments_sent_total 1"));

    assert!(matches!(
        init_telemetry(config),
        Err(TelemetryError::MetricsInit(_))
    ));
    drop(guard);
}
