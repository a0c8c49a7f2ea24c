//! Configuration for YahooClient

use crate::ProviderError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://fantasysports.yahooapis.com/fantasy/v2".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ProviderError> {
        let defaults = Self::default();

        let api_base_url = std::env::var("YAHOO_API_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_base_url);

        let request_timeout_secs = match std::env::var("YAHOO_REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| ProviderError::InvalidConfig {
                message: "Invalid YAHOO_REQUEST_TIMEOUT_SECS".to_string(),
            })?,
            Err(_) => defaults.request_timeout_secs,
        };

        Ok(Self { api_base_url, request_timeout_secs })
    }
}
