//! Force a token refresh and report the new expiry

use anyhow::Result;
use chrono::{TimeZone, Utc};
use token_store::{TokenService, TokenStoreConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = TokenStoreConfig::from_env()?;
    let service = TokenService::from_config(&config).await?;

    match service.force_refresh().await {
        Ok(tokens) => {
            let expires = Utc
                .timestamp_millis_opt(tokens.expires_at)
                .single()
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| tokens.expires_at.to_string());
            info!("Token refreshed, expires at {}", expires);
            Ok(())
        }
        Err(e) => {
            error!("Token refresh failed: {}", e);
            Err(e.into())
        }
    }
}
