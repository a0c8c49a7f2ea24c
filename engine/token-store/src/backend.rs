//! Persistence backends for the token pair
//!
//! Redis is the durable store shared by every process. The JSON file is a
//! development fallback and, when both are configured, a mirror.

use crate::config::RedisConfig;
use crate::token::TokenData;
use crate::Result;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Script};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Storage for the current token pair
#[async_trait]
pub trait TokenBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn load(&self) -> Result<Option<TokenData>>;

    async fn store(&self, tokens: &TokenData) -> Result<()>;

    /// Write `tokens` only if the stored pair still carries `expected_refresh`
    /// (or nothing is stored). Returns false when another writer got there first.
    async fn compare_and_store(&self, expected_refresh: &str, tokens: &TokenData) -> Result<bool>;
}

// KEYS[1] token key, ARGV[1] expected refresh token, ARGV[2] payload, ARGV[3] ttl seconds
const COMPARE_AND_SET: &str = r#"
local current = redis.call('GET', KEYS[1])
if current then
  local ok, decoded = pcall(cjson.decode, current)
  if ok and decoded['refreshToken'] ~= ARGV[1] then
    return 0
  end
end
if tonumber(ARGV[3]) > 0 then
  redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
else
  redis.call('SET', KEYS[1], ARGV[2])
end
return 1
"#;

/// Redis-backed token storage
pub struct RedisTokenBackend {
    connection_manager: ConnectionManager,
    key: String,
    ttl_secs: u64,
    compare_and_set: Script,
}

impl RedisTokenBackend {
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        let connection_manager = ConnectionManager::new(client).await?;

        Ok(Self {
            connection_manager,
            key: config.key.clone(),
            ttl_secs: config.ttl_secs,
            compare_and_set: Script::new(COMPARE_AND_SET),
        })
    }
}

#[async_trait]
impl TokenBackend for RedisTokenBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn load(&self) -> Result<Option<TokenData>> {
        let mut conn = self.connection_manager.clone();
        let raw: Option<String> = conn.get(&self.key).await?;

        match raw {
            Some(data) => {
                debug!("Loaded tokens from redis key {}", self.key);
                Ok(Some(serde_json::from_str(&data)?))
            }
            None => Ok(None),
        }
    }

    async fn store(&self, tokens: &TokenData) -> Result<()> {
        let mut conn = self.connection_manager.clone();
        let payload = serde_json::to_string(tokens)?;

        if self.ttl_secs > 0 {
            let _: () = conn.set_ex(&self.key, payload, self.ttl_secs).await?;
        } else {
            let _: () = conn.set(&self.key, payload).await?;
        }
        debug!("Stored tokens in redis key {}", self.key);
        Ok(())
    }

    async fn compare_and_store(&self, expected_refresh: &str, tokens: &TokenData) -> Result<bool> {
        let mut conn = self.connection_manager.clone();
        let payload = serde_json::to_string(tokens)?;

        let written: i32 = self
            .compare_and_set
            .key(&self.key)
            .arg(expected_refresh)
            .arg(payload)
            .arg(self.ttl_secs)
            .invoke_async(&mut conn)
            .await?;

        Ok(written == 1)
    }
}

/// Local JSON file token storage
#[derive(Debug, Clone)]
pub struct FileTokenBackend {
    path: PathBuf,
}

impl FileTokenBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenBackend for FileTokenBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<Option<TokenData>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, tokens: &TokenData) -> Result<()> {
        let payload = serde_json::to_string_pretty(tokens)?;
        tokio::fs::write(&self.path, payload).await?;
        debug!("Wrote tokens to {:?}", self.path);
        Ok(())
    }

    async fn compare_and_store(&self, expected_refresh: &str, tokens: &TokenData) -> Result<bool> {
        // Single-process development store: check then write.
        if let Some(current) = self.load().await? {
            if current.refresh_token != expected_refresh {
                return Ok(false);
            }
        }
        self.store(tokens).await?;
        Ok(true)
    }
}
