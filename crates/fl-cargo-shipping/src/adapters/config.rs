//! Configuration Providers
//!
//! `ConfigProvider` implementations: a static builder for tests and
//! development, and a TOML file loader for deployments.

use crate::domain::{
    CatalogId, ConfigError, LocalKind, Peer, ShippingConfig, DEFAULT_AUTH_TOKEN,
};
use crate::ports::outbound::ConfigProvider;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// Environment variable that overrides the configured auth token.
pub const AUTH_TOKEN_ENV: &str = "FL_AUTH_TOKEN";

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Configuration provider with values supplied in code.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: ShippingConfig,
    catalog: Vec<(LocalKind, CatalogId)>,
    peers: Vec<Peer>,
}

impl StaticConfigProvider {
    /// Default settings, empty catalog, no peers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given node settings.
    #[must_use]
    pub fn with_config(mut self, config: ShippingConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a catalog entry.
    #[must_use]
    pub fn with_catalog_entry(mut self, kind: &str, id: &str) -> Self {
        self.catalog.push((LocalKind::new(kind), CatalogId::new(id)));
        self
    }

    /// Register a peer.
    #[must_use]
    pub fn with_peer(mut self, peer: Peer) -> Self {
        self.peers.push(peer);
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn shipping_config(&self) -> ShippingConfig {
        self.config.clone()
    }

    fn catalog_entries(&self) -> Vec<(LocalKind, CatalogId)> {
        self.catalog.clone()
    }

    fn peers(&self) -> Vec<Peer> {
        self.peers.clone()
    }
}

// ============================================================================
// TomlConfigProvider - File-based configuration
// ============================================================================

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    shipping: ShippingConfig,
    #[serde(default)]
    catalog: BTreeMap<String, String>,
    #[serde(default)]
    peers: Vec<Peer>,
}

/// TOML-based configuration provider.
///
/// # Config File Format
///
/// ```toml
/// [shipping]
/// auth_token = "s3cret"
/// request_timeout_secs = 10
/// listen_address = "0.0.0.0:8080"
/// public_address = "http://dock-a.example:8080/shipping"
/// drop_location = { x = 12.0, y = 64.0, z = -3.0 }
/// fallback_location = { x = 0.0, y = 70.0, z = 0.0 }
///
/// [catalog]
/// iron_ore = "ore_sample"
/// oak_log = "timber"
///
/// [[peers]]
/// name = "north"
/// address = "http://north.example:8080/shipping"
/// allow = ["ore_sample"]
/// ```
///
/// Catalog entries register in key order. `FL_AUTH_TOKEN` overrides
/// `shipping.auth_token` when set. Loading fails when neither supplies a
/// token or the token is the placeholder from `ShippingConfig::default`.
#[derive(Debug, Clone)]
pub struct TomlConfigProvider {
    config: ShippingConfig,
    catalog: Vec<(LocalKind, CatalogId)>,
    peers: Vec<Peer>,
}

impl TomlConfigProvider {
    /// Load from a file, applying the environment override.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let provider = Self::load(&contents, env::var(AUTH_TOKEN_ENV).ok())?;

        info!(
            path = %path.display(),
            catalog_entries = provider.catalog.len(),
            peers = provider.peers.len(),
            "Loaded shipping configuration"
        );
        Ok(provider)
    }

    /// Parse TOML text without consulting the environment.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        Self::load(contents, None)
    }

    fn load(contents: &str, token_override: Option<String>) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;

        for peer in &file.peers {
            if peer.name.is_empty() || peer.address.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "peer {:?} needs both name and address",
                    peer.name
                )));
            }
        }

        let mut config = file.shipping;
        if let Some(token) = token_override {
            config.auth_token = token;
        }

        let provider = Self {
            config,
            catalog: file
                .catalog
                .into_iter()
                .map(|(kind, id)| (LocalKind::new(kind), CatalogId::new(id)))
                .collect(),
            peers: file.peers,
        };
        provider.validate()?;
        Ok(provider)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // A node on the placeholder token would accept calls from anyone.
        if self.config.has_placeholder_token() {
            return Err(ConfigError::Invalid(format!(
                "auth_token must be set (in [shipping] or {}) and must not be {:?}",
                AUTH_TOKEN_ENV, DEFAULT_AUTH_TOKEN
            )));
        }
        Ok(())
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn shipping_config(&self) -> ShippingConfig {
        self.config.clone()
    }

    fn catalog_entries(&self) -> Vec<(LocalKind, CatalogId)> {
        self.catalog.clone()
    }

    fn peers(&self) -> Vec<Peer> {
        self.peers.clone()
    }
}
