//! OAuth token pair as persisted in Redis and the token file

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Access tokens are treated as expired this long before their real expiry.
pub const REFRESH_MARGIN_MS: i64 = 60_000;

/// Lifetime assumed when the token endpoint omits `expires_in`.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Stored token pair. `expires_at` is epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl TokenData {
    /// Build a token pair that expires `expires_in_secs` from now
    pub fn issued_now(access_token: String, refresh_token: String, expires_in_secs: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: now_millis() + expires_in_secs * 1000,
        }
    }

    /// Whether the access token can still be used at `now_ms`
    pub fn is_fresh_at(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at - REFRESH_MARGIN_MS
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(now_millis())
    }
}

pub(crate) fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: i64) -> TokenData {
        TokenData {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at,
        }
    }

    #[test]
    fn test_fresh_outside_margin() {
        let t = token(1_000_000);
        assert!(t.is_fresh_at(1_000_000 - REFRESH_MARGIN_MS - 1));
    }

    #[test]
    fn test_stale_inside_margin() {
        let t = token(1_000_000);
        assert!(!t.is_fresh_at(1_000_000 - REFRESH_MARGIN_MS));
        assert!(!t.is_fresh_at(1_000_000 - 30_000));
        assert!(!t.is_fresh_at(2_000_000));
    }

    #[test]
    fn test_issued_now_expiry() {
        let before = now_millis();
        let t = TokenData::issued_now("a".into(), "r".into(), 3600);
        assert!(t.expires_at >= before + 3_600_000);
        assert!(t.is_fresh());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_value(token(42)).unwrap();
        assert_eq!(json["accessToken"], "access");
        assert_eq!(json["refreshToken"], "refresh");
        assert_eq!(json["expiresAt"], 42);
    }
}
