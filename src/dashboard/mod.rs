//! Dashboard Module
//!
//! Review-analytics components, their filter parameters and the service
//! that caches, composes, warms and invalidates them.

pub mod component;
mod query;
mod service;

pub use component::{Component, Period};
pub use query::DashboardQuery;
pub use service::DashboardService;
