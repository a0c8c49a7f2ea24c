//! Configuration for the dashboard server

use anyhow::{anyhow, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Game key of the season currently being played
pub const DEFAULT_CURRENT_GAME_KEY: &str = "461";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub cache: CacheConfig,

    /// Shared secret for `/api/cron/aggregate-stats`; unset means open
    #[serde(default)]
    pub cron_secret: Option<String>,

    /// Shared secret for `/api/auth/setup-tokens`; unset means always refused
    #[serde(default)]
    pub setup_secret: Option<String>,

    pub current_game_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,

    /// json, pretty or compact
    pub format: String,
}

/// Redis response cache for the all-time rankings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub redis_url: Option<String>,
    pub rankings_ttl_secs: u64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { host: "0.0.0.0".to_string(), port: 8080 },
            logging: LoggingConfig { level: "info".to_string(), format: "compact".to_string() },
            cache: CacheConfig { redis_url: None, rankings_ttl_secs: 300 },
            cron_secret: None,
            setup_secret: None,
            current_game_key: DEFAULT_CURRENT_GAME_KEY.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Defaults, then the optional TOML file, then `DASHBOARD_*` variables,
    /// then the unprefixed secrets and game key.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| "dashboard.toml".to_string());
        let defaults = Self::default();

        let mut config: Self = Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .set_default("cache.rankings_ttl_secs", defaults.cache.rankings_ttl_secs as i64)?
            .set_default("current_game_key", defaults.current_game_key)?
            .add_source(File::with_name(&path).required(false))
            // DASHBOARD_SERVER__PORT, DASHBOARD_LOGGING__FORMAT, ...
            .add_source(
                Environment::with_prefix("DASHBOARD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(secret) = std::env::var("CRON_SECRET") {
            self.cron_secret = Some(secret);
        }
        if let Ok(secret) = std::env::var("SETUP_SECRET") {
            self.setup_secret = Some(secret);
        }
        if let Ok(game_key) = std::env::var("CURRENT_GAME_KEY") {
            self.current_game_key = game_key;
        }
        if self.cache.redis_url.is_none() {
            self.cache.redis_url = std::env::var("REDIS_URL").ok();
        }

        // Empty values behave like unset ones
        self.cron_secret = self.cron_secret.take().filter(|s| !s.is_empty());
        self.setup_secret = self.setup_secret.take().filter(|s| !s.is_empty());
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(anyhow!("Invalid log level: {}", self.logging.level)),
        }

        match self.logging.format.as_str() {
            "json" | "pretty" | "compact" => {}
            _ => return Err(anyhow!("Invalid log format: {}", self.logging.format)),
        }

        if self.server.port == 0 {
            return Err(anyhow!("Invalid server port: {}", self.server.port));
        }

        if self.current_game_key.is_empty() {
            return Err(anyhow!("CURRENT_GAME_KEY must not be empty"));
        }

        Ok(())
    }

    pub fn bind_address(&self) -> Result<SocketAddr> {
        let address = format!("{}:{}", self.server.host, self.server.port);
        address.parse().map_err(|e| anyhow!("Invalid bind address {}: {}", address, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.current_game_key, "461");
        assert_eq!(config.bind_address().unwrap().port(), 8080);
    }

    #[test]
    fn test_bad_bind_address_names_it() {
        let mut config = DashboardConfig::default();
        config.server.host = "not a host".to_string();

        let err = config.bind_address().unwrap_err().to_string();
        assert!(err.contains("not a host:8080"));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = DashboardConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = DashboardConfig::default();
        config.server.port = 0;
        assert!(config.validate().unwrap_err().to_string().contains("port"));
    }

    #[test]
    fn test_load_reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(
            &path,
            "current_game_key = \"449\"\n[server]\nport = 9001\n[logging]\nformat = \"json\"\n",
        )
        .unwrap();

        std::env::set_var("DASHBOARD_CONFIG", &path);
        let loaded = DashboardConfig::load();
        std::env::remove_var("DASHBOARD_CONFIG");

        let config = loaded.unwrap();
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }
}
