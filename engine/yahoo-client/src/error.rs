//! Error types for YahooClient

use thiserror::Error;
use token_store::TokenStoreError;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Yahoo API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Token error: {0}")]
    Token(#[from] TokenStoreError),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ProviderError {
    /// HTTP status reported by Yahoo, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A response that did not have the nesting we expect
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unexpected Yahoo response shape: missing {0}")]
pub struct ShapeError(pub &'static str);
