//! # Freightline Node
//!
//! Runs one shipping node: loads the TOML configuration, installs
//! telemetry, and serves peer calls over HTTP until Ctrl+C.
//!
//! ```text
//! freightline-node [CONFIG]      # default: $FL_CONFIG or ./freightline.toml
//! ```
//!
//! The world is held in memory; hosts embedding a real game world use the
//! library with their own `ObjectLifecycle`.

use std::env;
use std::sync::Arc;

use anyhow::{Context, Result};
use fl_cargo_shipping::{
    ConfigProvider, HttpCallServer, HttpTransport, InMemoryWorld, ShippingService,
    TomlConfigProvider,
};
use fl_telemetry::{init_telemetry, TelemetryConfig};
use tracing::info;

const CONFIG_PATH_ENV: &str = "FL_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "freightline.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config_path = env::args()
        .nth(1)
        .or_else(|| env::var(CONFIG_PATH_ENV).ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let provider = TomlConfigProvider::from_file(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;
    let config = provider.shipping_config();

    let transport = Arc::new(HttpTransport::new(&config)?);
    let world = Arc::new(InMemoryWorld::new());
    let service = Arc::new(ShippingService::from_provider(&provider, transport, world));

    let server = HttpCallServer::bind(&config.listen_address, service)
        .await
        .with_context(|| format!("binding {}", config.listen_address))?;

    info!(
        listen = %server.local_addr(),
        public_address = config.public_address.as_deref().unwrap_or("<unset>"),
        "Node is running. Press Ctrl+C to stop."
    );
    tokio::signal::ctrl_c().await?;

    server.shutdown().await?;
    Ok(())
}
