//! # Stats Aggregator
//!
//! Pulls standings and weekly scoreboards from Yahoo, upserts them into the
//! league store, and rebuilds the derived tables: a cumulative ranking per
//! manager for every week of every league, and all-time rankings summed over
//! every season a manager played.
//!
//! The math lives in [`ranking`] and [`fun_facts`] as pure functions over
//! stored rows; [`job`] does the I/O around it through the
//! [`LeagueDataSource`] and [`LeagueRepository`] seams.

pub mod config;
pub mod fun_facts;
pub mod job;
pub mod ranking;
pub mod repository;
pub mod scheduler;


pub use config::{AggregationScope, AggregatorConfig};
pub use fun_facts::{fun_facts, FunFact};
pub use job::{
    recompute_all_time_rankings, recompute_weekly_rankings, AggregationJob, AggregationSummary,
    LeagueDataSource,
};
pub use repository::LeagueRepository;
pub use scheduler::AggregationScheduler;
