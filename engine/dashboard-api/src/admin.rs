//! Cron trigger and token setup endpoints

use crate::cache::ALL_TIME_RANKINGS_KEY;
use crate::error::ApiError;
use crate::state::AppState;
use serde::Deserialize;
use serde_json::{json, Value};
use token_store::TokenData;
use tracing::{error, info, warn};
use warp::{Rejection, Reply};

/// Body of POST /api/auth/setup-tokens. `expiresAt` is epoch milliseconds,
/// sent either as a number or as a numeric string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupTokensRequest {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_at: Option<Value>,
    pub secret: Option<String>,
}

impl SetupTokensRequest {
    /// Secret first, then the token fields
    pub fn validate(self, setup_secret: Option<&str>) -> Result<TokenData, ApiError> {
        match (setup_secret, self.secret.as_deref()) {
            (Some(expected), Some(given)) if expected == given => {}
            _ => return Err(ApiError::Unauthorized),
        }

        let missing = || {
            ApiError::BadRequest(
                "Missing required fields: accessToken, refreshToken, expiresAt".to_string(),
            )
        };

        let access_token = self.access_token.filter(|t| !t.is_empty()).ok_or_else(missing)?;
        let refresh_token = self.refresh_token.filter(|t| !t.is_empty()).ok_or_else(missing)?;
        let expires_at = match self.expires_at {
            None | Some(Value::Null) => return Err(missing()),
            Some(raw) => parse_expires_at(&raw)?,
        };
        if expires_at == 0 {
            return Err(missing());
        }

        Ok(TokenData { access_token, refresh_token, expires_at })
    }
}

fn parse_expires_at(raw: &Value) -> Result<i64, ApiError> {
    let parsed = match raw {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) if s.is_empty() => Some(0),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| ApiError::BadRequest(format!("Invalid expiresAt: {}", raw)))
}

/// Whether the Authorization header carries the cron secret. With no secret
/// configured every request is allowed.
pub fn cron_authorized(cron_secret: Option<&str>, authorization: Option<&str>) -> bool {
    match cron_secret {
        None => true,
        Some(secret) => authorization
            .and_then(|header| header.strip_prefix("Bearer "))
            .map_or(false, |token| token == secret),
    }
}

/// GET /api/cron/aggregate-stats
pub async fn aggregate_stats(
    authorization: Option<String>,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    if !cron_authorized(state.settings.cron_secret.as_deref(), authorization.as_deref()) {
        warn!("Rejected aggregation request with a bad or missing bearer token");
        return Err(ApiError::Unauthorized.into());
    }

    info!("Aggregation triggered over HTTP");
    let summary = state.job.run().await.map_err(|e| {
        error!("Aggregation failed: {:#}", e);
        ApiError::Internal(format!("Aggregation failed: {}", e))
    })?;

    if let Some(cache) = &state.cache {
        if let Err(e) = cache.delete(ALL_TIME_RANKINGS_KEY).await {
            warn!("Failed to drop cached rankings: {}", e);
        }
    }

    Ok(warp::reply::json(&summary))
}

/// POST /api/auth/setup-tokens
pub async fn setup_tokens(
    request: SetupTokensRequest,
    state: AppState,
) -> Result<impl Reply, Rejection> {
    let tokens = request.validate(state.settings.setup_secret.as_deref())?;

    state.tokens.set_tokens(tokens).await.map_err(ApiError::from)?;
    info!("Yahoo tokens stored via setup endpoint");

    Ok(warp::reply::json(&json!({ "success": true, "message": "Tokens saved" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(secret: Option<&str>, expires_at: Option<Value>) -> SetupTokensRequest {
        SetupTokensRequest {
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            expires_at,
            secret: secret.map(str::to_string),
        }
    }

    #[test]
    fn test_cron_authorization() {
        assert!(cron_authorized(None, None));
        assert!(cron_authorized(None, Some("Bearer anything")));
        assert!(cron_authorized(Some("s3cret"), Some("Bearer s3cret")));
        assert!(!cron_authorized(Some("s3cret"), Some("Bearer wrong")));
        assert!(!cron_authorized(Some("s3cret"), Some("s3cret")));
        assert!(!cron_authorized(Some("s3cret"), None));
    }

    #[test]
    fn test_setup_requires_configured_secret() {
        let result = request(Some("s3cret"), Some(json!(1_700_000_000_000i64))).validate(None);
        assert!(matches!(result, Err(ApiError::Unauthorized)));

        let result = request(Some("wrong"), Some(json!(1))).validate(Some("s3cret"));
        assert!(matches!(result, Err(ApiError::Unauthorized)));

        let result = request(None, Some(json!(1))).validate(Some("s3cret"));
        assert!(matches!(result, Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_setup_accepts_number_or_string_expiry() {
        let tokens = request(Some("s3cret"), Some(json!(1_700_000_000_000i64)))
            .validate(Some("s3cret"))
            .unwrap();
        assert_eq!(tokens.expires_at, 1_700_000_000_000);
        assert_eq!(tokens.access_token, "access");

        let tokens = request(Some("s3cret"), Some(json!("1700000000000")))
            .validate(Some("s3cret"))
            .unwrap();
        assert_eq!(tokens.expires_at, 1_700_000_000_000);
    }

    #[test]
    fn test_setup_missing_fields() {
        let result = request(Some("s3cret"), None).validate(Some("s3cret"));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));

        let mut missing_access = request(Some("s3cret"), Some(json!(1)));
        missing_access.access_token = Some(String::new());
        assert!(matches!(missing_access.validate(Some("s3cret")), Err(ApiError::BadRequest(_))));

        let result = request(Some("s3cret"), Some(json!("soon"))).validate(Some("s3cret"));
        assert!(matches!(result, Err(ApiError::BadRequest(_))));
    }
}
