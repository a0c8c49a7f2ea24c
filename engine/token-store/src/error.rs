//! Error types for TokenStore

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenStoreError {
    #[error(
        "No Yahoo tokens found. Run `setup-yahoo` or POST /api/auth/setup-tokens to configure them"
    )]
    NotConfigured,

    #[error("Token refresh failed: {message}")]
    RefreshFailed { message: String },

    #[error("OAuth error: {0}")]
    OAuth(
        #[from]
        oauth2::RequestTokenError<
            oauth2::reqwest::Error<reqwest::Error>,
            oauth2::basic::BasicErrorResponse,
        >,
    ),

    #[error("Redis error: {0}")]
    RedisError(#[from] redis::RedisError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}
