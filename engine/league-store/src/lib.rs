//! # League Store
//!
//! PostgreSQL persistence for the league dashboard: managers, league seasons,
//! teams, weekly matchups, weekly rankings and all-time rankings.
//!
//! Every write is an upsert keyed on the row's natural key, so re-running an
//! aggregation over the same data leaves the tables unchanged.

pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use config::DatabaseConfig;
pub use error::StoreError;
pub use models::*;
pub use store::LeagueStore;

pub type Result<T> = std::result::Result<T, StoreError>;
