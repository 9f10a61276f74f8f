//! Sentiment Cache - caching layer for review-sentiment analytics
//!
//! Serves per-product dashboard aggregates through a Redis (or in-process)
//! cache with fetch-or-compute, entity invalidation and concurrent warming.

pub mod api;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod source;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::{spawn_cleanup_task, spawn_health_task};
