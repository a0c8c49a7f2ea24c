//! Configuration for TokenStore

use crate::TokenStoreError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Yahoo OAuth application credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YahooOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub auth_url: String,
    pub token_url: String,
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub key: String,
    pub ttl_secs: u64,
}

/// TokenStore configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenStoreConfig {
    pub oauth: YahooOAuthConfig,
    /// Durable store. Without it the token file becomes the primary store.
    pub redis: Option<RedisConfig>,
    pub token_file: Option<PathBuf>,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            oauth: YahooOAuthConfig {
                client_id: "".to_string(),
                client_secret: "".to_string(),
                redirect_url: "https://localhost:3000/callback".to_string(),
                auth_url: "https://api.login.yahoo.com/oauth2/request_auth".to_string(),
                token_url: "https://api.login.yahoo.com/oauth2/get_token".to_string(),
            },
            redis: None,
            token_file: Some(PathBuf::from(".yahoo-tokens.json")),
        }
    }
}

impl TokenStoreConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, TokenStoreError> {
        let defaults = Self::default();

        let client_id = std::env::var("YAHOO_CLIENT_ID").map_err(|_| {
            TokenStoreError::InvalidConfig { message: "YAHOO_CLIENT_ID not set".to_string() }
        })?;

        let client_secret = std::env::var("YAHOO_CLIENT_SECRET").map_err(|_| {
            TokenStoreError::InvalidConfig { message: "YAHOO_CLIENT_SECRET not set".to_string() }
        })?;

        let redirect_url =
            std::env::var("YAHOO_REDIRECT_URI").unwrap_or(defaults.oauth.redirect_url);

        let ttl_secs = std::env::var("YAHOO_TOKEN_TTL_SECS")
            .unwrap_or_else(|_| (60 * 60 * 24 * 30).to_string())
            .parse::<u64>()
            .map_err(|_| TokenStoreError::InvalidConfig {
                message: "Invalid YAHOO_TOKEN_TTL_SECS".to_string(),
            })?;

        let key =
            std::env::var("YAHOO_TOKEN_KEY").unwrap_or_else(|_| "yahoo-tokens".to_string());
        let redis = std::env::var("REDIS_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .map(|url| RedisConfig { url, key, ttl_secs });

        let token_file = match std::env::var("YAHOO_TOKEN_FILE") {
            Ok(path) if path.is_empty() => None,
            Ok(path) => Some(PathBuf::from(path)),
            Err(_) => defaults.token_file,
        };

        Ok(Self {
            oauth: YahooOAuthConfig {
                client_id,
                client_secret,
                redirect_url,
                auth_url: defaults.oauth.auth_url,
                token_url: defaults.oauth.token_url,
            },
            redis,
            token_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_redis_settings() {
        std::env::set_var("YAHOO_CLIENT_ID", "client");
        std::env::set_var("YAHOO_CLIENT_SECRET", "secret");
        std::env::set_var("REDIS_URL", "redis://localhost:6379");
        std::env::remove_var("YAHOO_TOKEN_KEY");
        std::env::remove_var("YAHOO_TOKEN_TTL_SECS");

        let defaulted = TokenStoreConfig::from_env();

        std::env::set_var("YAHOO_TOKEN_KEY", "league-tokens");
        std::env::set_var("REDIS_URL", "");
        let without_redis = TokenStoreConfig::from_env();

        for key in ["YAHOO_CLIENT_ID", "YAHOO_CLIENT_SECRET", "REDIS_URL", "YAHOO_TOKEN_KEY"] {
            std::env::remove_var(key);
        }

        let redis = defaulted.unwrap().redis.unwrap();
        assert_eq!(redis.url, "redis://localhost:6379");
        assert_eq!(redis.key, "yahoo-tokens");
        assert_eq!(redis.ttl_secs, 60 * 60 * 24 * 30);

        assert!(without_redis.unwrap().redis.is_none());
    }
}
