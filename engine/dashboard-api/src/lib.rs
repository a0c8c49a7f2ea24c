//! # Dashboard API
//!
//! HTTP surface of the league dashboard. Live league data is proxied from
//! Yahoo with Cache-Control headers tuned per season; rankings, scoreboards,
//! managers and fun facts are served from the league store. Two write
//! endpoints exist: the cron trigger for the aggregation job and the initial
//! token setup.

pub mod admin;
pub mod cache;
pub mod cache_control;
pub mod config;
pub mod error;
pub mod fantasy;
pub mod logging;
pub mod rankings;
pub mod rest_api;
pub mod state;

pub use cache::ResponseCache;
pub use config::DashboardConfig;
pub use error::ApiError;
pub use rest_api::create_routes;
pub use state::{ApiSettings, AppState};
