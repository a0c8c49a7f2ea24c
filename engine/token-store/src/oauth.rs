//! Yahoo OAuth integration

use crate::config::YahooOAuthConfig;
use crate::token::{TokenData, DEFAULT_EXPIRES_IN_SECS};
use crate::{Result, TokenStoreError};
use async_trait::async_trait;
use oauth2::basic::{BasicClient, BasicTokenResponse};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};

/// Read-only fantasy sports scope
const FANTASY_READ_SCOPE: &str = "fspt-r";

/// Exchanges a refresh token for a new token pair.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenData>;
}

/// Yahoo OAuth client
#[derive(Debug, Clone)]
pub struct YahooOAuthClient {
    client: BasicClient,
}

impl YahooOAuthClient {
    /// Create a new Yahoo OAuth client
    pub fn new(config: &YahooOAuthConfig) -> Result<Self> {
        let client = BasicClient::new(
            ClientId::new(config.client_id.clone()),
            Some(ClientSecret::new(config.client_secret.clone())),
            AuthUrl::new(config.auth_url.clone()).map_err(|e| TokenStoreError::InvalidConfig {
                message: format!("Invalid auth URL: {}", e),
            })?,
            Some(TokenUrl::new(config.token_url.clone()).map_err(|e| {
                TokenStoreError::InvalidConfig { message: format!("Invalid token URL: {}", e) }
            })?),
        )
        .set_redirect_uri(RedirectUrl::new(config.redirect_url.clone()).map_err(|e| {
            TokenStoreError::InvalidConfig { message: format!("Invalid redirect URL: {}", e) }
        })?);

        Ok(Self { client })
    }

    /// URL the operator opens to authorize read access
    pub fn authorization_url(&self) -> String {
        let (auth_url, _) = self
            .client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(FANTASY_READ_SCOPE.to_string()))
            .url();
        auth_url.to_string()
    }

    /// Exchange an authorization code for the first token pair
    pub async fn exchange_code(&self, code: &str) -> Result<TokenData> {
        let response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(oauth2::reqwest::async_http_client)
            .await?;

        let refresh_token = response
            .refresh_token()
            .map(|t| t.secret().clone())
            .ok_or_else(|| TokenStoreError::RefreshFailed {
                message: "authorization response did not include a refresh token".to_string(),
            })?;

        Ok(into_token_data(&response, refresh_token))
    }
}

#[async_trait]
impl TokenRefresher for YahooOAuthClient {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenData> {
        let response = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(oauth2::reqwest::async_http_client)
            .await?;

        // Yahoo may or may not rotate the refresh token
        let next_refresh = response
            .refresh_token()
            .map(|t| t.secret().clone())
            .unwrap_or_else(|| refresh_token.to_string());

        Ok(into_token_data(&response, next_refresh))
    }
}

fn into_token_data(response: &BasicTokenResponse, refresh_token: String) -> TokenData {
    let expires_in = response
        .expires_in()
        .map(|d| d.as_secs() as i64)
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

    TokenData::issued_now(response.access_token().secret().clone(), refresh_token, expires_in)
}
