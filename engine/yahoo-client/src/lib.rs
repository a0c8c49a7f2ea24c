//! YahooClient - Yahoo Fantasy Sports API access
//!
//! Yahoo answers with deeply nested, position-indexed JSON. All of that is
//! handled in [`parse`]; callers only ever see the flat records in [`models`].

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod parse;

pub use client::YahooClient;
pub use config::ProviderConfig;
pub use error::{ProviderError, ShapeError};
pub use models::*;

// Result type alias
pub type Result<T> = std::result::Result<T, ProviderError>;
