//! HTTP Transport Adapter
//!
//! Implements `RemoteTransport` with one GET per call, parameters in the
//! query string. When the node has a public address it is sent in
//! [`ORIGIN_HEADER`] so the receiver can address its reply.

use crate::domain::{ConfigError, ShippingConfig};
use crate::ports::outbound::RemoteTransport;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the caller's reply address.
pub const ORIGIN_HEADER: &str = "x-freightline-origin";

/// reqwest-based transport.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the configured timeouts and origin header.
    pub fn new(config: &ShippingConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        if let Some(origin) = &config.public_address {
            let value = HeaderValue::from_str(origin).map_err(|e| {
                ConfigError::Invalid(format!("public_address {:?}: {}", origin, e))
            })?;
            headers.insert(ORIGIN_HEADER, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ConfigError::Invalid(format!("http client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl RemoteTransport for HttpTransport {
    async fn call(&self, address: &str, params: &[(String, String)]) -> Option<String> {
        debug!(address, "Sending remote call");

        let response = match self.client.get(address).query(params).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(address, error = %e, "Remote call got no response");
                return None;
            }
        };

        let status = response.status();
        match response.text().await {
            Ok(body) => {
                debug!(address, http_status = status.as_u16(), "Remote call answered");
                Some(body)
            }
            Err(e) => {
                warn!(address, error = %e, "Remote call body unreadable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_with_default_config() {
        assert!(HttpTransport::new(&ShippingConfig::default()).is_ok());
    }

    #[test]
    fn test_new_rejects_unusable_public_address() {
        let config = ShippingConfig {
            public_address: Some("http://dock\nb".to_string()),
            ..ShippingConfig::default()
        };
        assert!(matches!(
            HttpTransport::new(&config),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_address_is_no_response() {
        let config = ShippingConfig {
            request_timeout_secs: 1,
            connect_timeout_secs: 1,
            ..ShippingConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        // Port 9 (discard) on loopback is closed on test hosts.
        let body = transport.call("http://127.0.0.1:9/shipping", &[]).await;
        assert!(body.is_none());
    }
}
