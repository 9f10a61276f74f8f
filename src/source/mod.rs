//! Analytics Sources
//!
//! Producers of the per-component review aggregates that the cache layer
//! stores. The HTTP layer and the dashboard service only see the trait.

mod file;

use async_trait::async_trait;

use crate::cache::Fetched;
use crate::dashboard::{Component, DashboardQuery};

pub use file::FileSource;

/// Computes one dashboard component for a query.
///
/// `Ok(None)` means the source has no data for the query; such results are
/// never cached.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch(&self, component: Component, query: &DashboardQuery) -> Fetched;
}
