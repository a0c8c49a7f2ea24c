//! TokenStore - Yahoo OAuth credentials for provider calls
//!
//! Holds the current access/refresh token pair, refreshes it lazily when it is
//! about to expire, and persists it to Redis with a local JSON file as a
//! development fallback.

pub mod backend;
pub mod config;
pub mod error;
pub mod oauth;
pub mod service;
pub mod token;

pub use backend::{FileTokenBackend, RedisTokenBackend, TokenBackend};
pub use config::TokenStoreConfig;
pub use error::TokenStoreError;
pub use oauth::{TokenRefresher, YahooOAuthClient};
pub use service::TokenService;
pub use token::TokenData;

// Result type alias
pub type Result<T> = std::result::Result<T, TokenStoreError>;
