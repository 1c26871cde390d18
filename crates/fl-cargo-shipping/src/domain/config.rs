//! # Shipping Configuration

use super::value_objects::Location;
use serde::{Deserialize, Serialize};

/// Placeholder token used by [`ShippingConfig::default`]. Never valid in a
/// loaded configuration.
pub const DEFAULT_AUTH_TOKEN: &str = "changeme";

/// Node-level shipping settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingConfig {
    /// Shared secret attached to every remote call.
    pub auth_token: String,
    /// Where manufactured items are placed.
    pub drop_location: Location,
    /// Where items go when a peer denies a transfer.
    pub fallback_location: Location,
    /// Whole-request timeout for the HTTP transport.
    pub request_timeout_secs: u64,
    /// Connect timeout for the HTTP transport.
    pub connect_timeout_secs: u64,
    /// Socket address the HTTP call server binds to.
    pub listen_address: String,
    /// URL peers use to reach this node. Sent with every HTTP call so the
    /// receiver knows where to direct its reply.
    pub public_address: Option<String>,
}

impl ShippingConfig {
    /// Whether the token is missing or still the placeholder.
    pub fn has_placeholder_token(&self) -> bool {
        self.auth_token.trim().is_empty() || self.auth_token == DEFAULT_AUTH_TOKEN
    }
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            drop_location: Location::default(),
            fallback_location: Location::default(),
            request_timeout_secs: 10,
            connect_timeout_secs: 3,
            listen_address: "127.0.0.1:8080".to_string(),
            public_address: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ShippingConfig::default();
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.connect_timeout_secs, 3);
        assert_eq!(config.listen_address, "127.0.0.1:8080");
        assert!(config.public_address.is_none());
    }

    #[test]
    fn test_placeholder_token_detected() {
        let mut config = ShippingConfig::default();
        assert!(config.has_placeholder_token());

        config.auth_token = "  ".to_string();
        assert!(config.has_placeholder_token());

        config.auth_token = "s3cret".to_string();
        assert!(!config.has_placeholder_token());
    }
}
