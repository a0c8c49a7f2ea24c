//! Redis response cache
//!
//! Only the all-time rankings are cached here; they change once per
//! aggregation run and the cron endpoint drops the entry afterwards.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

pub const ALL_TIME_RANKINGS_KEY: &str = "all-time-rankings";

pub struct ResponseCache {
    connection_manager: ConnectionManager,
    ttl: Duration,
}

impl ResponseCache {
    pub async fn connect(redis_url: &str, ttl: Duration) -> Result<Self, redis::RedisError> {
        let client = Client::open(redis_url)?;
        let connection_manager = ConnectionManager::new(client).await?;

        Ok(Self { connection_manager, ttl })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, redis::RedisError> {
        let mut conn = self.connection_manager.clone();
        let cached: Option<String> = conn.get(key).await?;

        let Some(data) = cached else {
            debug!("Cache miss for key: {}", key);
            return Ok(None);
        };

        let value = serde_json::from_str(&data).map_err(|e| {
            redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "JSON deserialization failed",
                e.to_string(),
            ))
        })?;
        debug!("Cache hit for key: {}", key);
        Ok(Some(value))
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), redis::RedisError> {
        let mut conn = self.connection_manager.clone();
        let serialized = serde_json::to_string(value).map_err(|e| {
            redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "JSON serialization failed",
                e.to_string(),
            ))
        })?;

        let _: () = conn.set_ex(key, serialized, self.ttl.as_secs()).await?;
        debug!("Cached {} for {}s", key, self.ttl.as_secs());
        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<(), redis::RedisError> {
        let mut conn = self.connection_manager.clone();
        let _: () = conn.del(key).await?;
        debug!("Deleted cache key: {}", key);
        Ok(())
    }
}
