//! TokenService implementation

use crate::backend::{FileTokenBackend, RedisTokenBackend, TokenBackend};
use crate::config::TokenStoreConfig;
use crate::oauth::{TokenRefresher, YahooOAuthClient};
use crate::token::TokenData;
use crate::{Result, TokenStoreError};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Supplies a currently valid bearer token for provider calls.
///
/// The last loaded token is cached in-process. The mutex is held across a
/// refresh so callers in one process never refresh concurrently.
pub struct TokenService {
    primary: Arc<dyn TokenBackend>,
    fallback: Option<Arc<dyn TokenBackend>>,
    refresher: Arc<dyn TokenRefresher>,
    cached: Mutex<Option<TokenData>>,
}

impl TokenService {
    pub fn new(
        primary: Arc<dyn TokenBackend>,
        fallback: Option<Arc<dyn TokenBackend>>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        Self { primary, fallback, refresher, cached: Mutex::new(None) }
    }

    /// Wire backends from configuration: Redis first, the token file as fallback.
    pub async fn from_config(config: &TokenStoreConfig) -> Result<Self> {
        let refresher: Arc<dyn TokenRefresher> = Arc::new(YahooOAuthClient::new(&config.oauth)?);
        let file = config
            .token_file
            .as_ref()
            .map(|path| Arc::new(FileTokenBackend::new(path.clone())) as Arc<dyn TokenBackend>);

        let service = match (&config.redis, file) {
            (Some(redis), file) => {
                let primary: Arc<dyn TokenBackend> =
                    Arc::new(RedisTokenBackend::connect(redis).await?);
                Self::new(primary, file, refresher)
            }
            (None, Some(file)) => {
                warn!("REDIS_URL not set, storing Yahoo tokens in a local file only");
                Self::new(file, None, refresher)
            }
            (None, None) => {
                return Err(TokenStoreError::InvalidConfig {
                    message: "either REDIS_URL or YAHOO_TOKEN_FILE must be set".to_string(),
                })
            }
        };

        Ok(service)
    }

    /// Current access token, refreshing it first when it is about to expire
    pub async fn get_valid_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(tokens) = cached.as_ref() {
            if tokens.is_fresh() {
                return Ok(tokens.access_token.clone());
            }
        }

        let stored = self.load_stored().await?.ok_or(TokenStoreError::NotConfigured)?;
        let tokens = if stored.is_fresh() {
            stored
        } else {
            self.refresh_and_persist(&stored).await?
        };

        let access_token = tokens.access_token.clone();
        *cached = Some(tokens);
        Ok(access_token)
    }

    /// Replace the stored pair, e.g. from the setup endpoint
    pub async fn set_tokens(&self, tokens: TokenData) -> Result<()> {
        let mut cached = self.cached.lock().await;

        self.primary.store(&tokens).await?;
        self.mirror(&tokens).await;
        info!("Stored new Yahoo tokens in {}", self.primary.name());

        *cached = Some(tokens);
        Ok(())
    }

    /// Refresh regardless of the current expiry
    pub async fn force_refresh(&self) -> Result<TokenData> {
        let mut cached = self.cached.lock().await;

        let stored = self.load_stored().await?.ok_or(TokenStoreError::NotConfigured)?;
        let tokens = self.refresh_and_persist(&stored).await?;

        *cached = Some(tokens.clone());
        Ok(tokens)
    }

    /// Drop the in-process copy so the next call reads the store
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn load_stored(&self) -> Result<Option<TokenData>> {
        if let Some(tokens) = self.primary.load().await? {
            return Ok(Some(tokens));
        }

        let Some(fallback) = &self.fallback else {
            return Ok(None);
        };

        match fallback.load().await? {
            Some(tokens) => {
                self.primary.store(&tokens).await?;
                info!(
                    "Migrated Yahoo tokens from {} store to {} store",
                    fallback.name(),
                    self.primary.name()
                );
                Ok(Some(tokens))
            }
            None => Ok(None),
        }
    }

    async fn refresh_and_persist(&self, stale: &TokenData) -> Result<TokenData> {
        info!("Refreshing Yahoo access token");
        let refreshed = self.refresher.refresh(&stale.refresh_token).await?;

        if !self.primary.compare_and_store(&stale.refresh_token, &refreshed).await? {
            warn!("Yahoo tokens were refreshed concurrently by another process");
            if let Some(current) = self.primary.load().await? {
                if current.is_fresh() {
                    self.mirror(&current).await;
                    return Ok(current);
                }
            }
            self.primary.store(&refreshed).await?;
        }

        self.mirror(&refreshed).await;
        info!("Yahoo access token refreshed, expires at {}", refreshed.expires_at);
        Ok(refreshed)
    }

    async fn mirror(&self, tokens: &TokenData) {
        if let Some(fallback) = &self.fallback {
            if let Err(e) = fallback.store(tokens).await {
                warn!("Failed to mirror tokens to {} store: {}", fallback.name(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use tokio_test::{assert_err, assert_ok};

    #[derive(Default)]
    struct MemoryBackend {
        tokens: StdMutex<Option<TokenData>>,
        loads: AtomicUsize,
        // Simulates another process rotating the token between our read and write
        rotate_on_cas: StdMutex<Option<TokenData>>,
    }

    impl MemoryBackend {
        fn with(tokens: TokenData) -> Self {
            let backend = Self::default();
            *backend.tokens.lock().unwrap() = Some(tokens);
            backend
        }

        fn current(&self) -> Option<TokenData> {
            self.tokens.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TokenBackend for MemoryBackend {
        fn name(&self) -> &'static str {
            "memory"
        }

        async fn load(&self) -> Result<Option<TokenData>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.current())
        }

        async fn store(&self, tokens: &TokenData) -> Result<()> {
            *self.tokens.lock().unwrap() = Some(tokens.clone());
            Ok(())
        }

        async fn compare_and_store(&self, expected: &str, tokens: &TokenData) -> Result<bool> {
            if let Some(other) = self.rotate_on_cas.lock().unwrap().take() {
                *self.tokens.lock().unwrap() = Some(other);
            }
            let mut slot = self.tokens.lock().unwrap();
            match slot.as_ref() {
                Some(current) if current.refresh_token != expected => Ok(false),
                _ => {
                    *slot = Some(tokens.clone());
                    Ok(true)
                }
            }
        }
    }

    #[derive(Default)]
    struct CountingRefresher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenRefresher for CountingRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<TokenData> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TokenData::issued_now(
                format!("access-{}", n),
                format!("{}-rotated", refresh_token),
                3600,
            ))
        }
    }

    fn fresh(access: &str, refresh: &str) -> TokenData {
        TokenData::issued_now(access.to_string(), refresh.to_string(), 3600)
    }

    fn expired(refresh: &str) -> TokenData {
        TokenData {
            access_token: "old-access".to_string(),
            refresh_token: refresh.to_string(),
            expires_at: 0,
        }
    }

    fn service(
        primary: Arc<MemoryBackend>,
        fallback: Option<Arc<MemoryBackend>>,
        refresher: Arc<CountingRefresher>,
    ) -> TokenService {
        TokenService::new(primary, fallback.map(|f| f as Arc<dyn TokenBackend>), refresher)
    }

    #[tokio::test]
    async fn test_missing_tokens_is_not_configured() {
        let svc = service(Arc::default(), Some(Arc::default()), Arc::default());

        let err = assert_err!(svc.get_valid_token().await);
        assert!(matches!(err, TokenStoreError::NotConfigured));
        assert!(err.to_string().contains("setup-yahoo"));
    }

    #[tokio::test]
    async fn test_fresh_token_is_cached_in_process() {
        let primary = Arc::new(MemoryBackend::with(fresh("a1", "r1")));
        let refresher = Arc::new(CountingRefresher::default());
        let svc = service(primary.clone(), None, refresher.clone());

        assert_eq!(assert_ok!(svc.get_valid_token().await), "a1");
        assert_eq!(assert_ok!(svc.get_valid_token().await), "a1");

        assert_eq!(primary.loads.load(Ordering::SeqCst), 1);
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed_and_persisted() {
        let primary = Arc::new(MemoryBackend::with(expired("r1")));
        let mirror = Arc::new(MemoryBackend::default());
        let refresher = Arc::new(CountingRefresher::default());
        let svc = service(primary.clone(), Some(mirror.clone()), refresher.clone());

        assert_eq!(assert_ok!(svc.get_valid_token().await), "access-1");

        let stored = primary.current().unwrap();
        assert_eq!(stored.access_token, "access-1");
        assert_eq!(stored.refresh_token, "r1-rotated");
        assert!(stored.is_fresh());
        assert_eq!(mirror.current(), Some(stored));
    }

    #[tokio::test]
    async fn test_file_tokens_migrate_into_durable_store() {
        let primary = Arc::new(MemoryBackend::default());
        let file = Arc::new(MemoryBackend::with(fresh("from-file", "r1")));
        let svc = service(primary.clone(), Some(file), Arc::default());

        assert_eq!(assert_ok!(svc.get_valid_token().await), "from-file");
        assert_eq!(primary.current().unwrap().access_token, "from-file");
    }

    #[tokio::test]
    async fn test_lost_refresh_race_uses_other_process_token() {
        let primary = Arc::new(MemoryBackend::with(expired("r1")));
        *primary.rotate_on_cas.lock().unwrap() = Some(fresh("theirs", "r2"));
        let svc = service(primary.clone(), None, Arc::default());

        assert_eq!(assert_ok!(svc.get_valid_token().await), "theirs");
        assert_eq!(primary.current().unwrap().refresh_token, "r2");
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let primary = Arc::new(MemoryBackend::with(expired("r1")));
        let refresher = Arc::new(CountingRefresher::default());
        let svc = Arc::new(service(primary, None, refresher.clone()));

        let (a, b) = tokio::join!(svc.get_valid_token(), svc.get_valid_token());

        assert_eq!(assert_ok!(a), "access-1");
        assert_eq!(assert_ok!(b), "access-1");
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_set_tokens_replaces_cache_and_store() {
        let primary = Arc::new(MemoryBackend::with(fresh("a1", "r1")));
        let svc = service(primary.clone(), None, Arc::default());
        assert_eq!(assert_ok!(svc.get_valid_token().await), "a1");

        assert_ok!(svc.set_tokens(fresh("a2", "r2")).await);

        assert_eq!(assert_ok!(svc.get_valid_token().await), "a2");
        assert_eq!(primary.current().unwrap().refresh_token, "r2");
    }

    #[tokio::test]
    async fn test_force_refresh_ignores_expiry() {
        let primary = Arc::new(MemoryBackend::with(fresh("a1", "r1")));
        let refresher = Arc::new(CountingRefresher::default());
        let svc = service(primary, None, refresher.clone());

        let tokens = assert_ok!(svc.force_refresh().await);

        assert_eq!(tokens.access_token, "access-1");
        assert_eq!(refresher.calls.load(Ordering::SeqCst), 1);
    }
}
