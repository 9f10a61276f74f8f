//! Response DTOs for the dashboard cache API
//!
//! Reports from the cache layer serialize directly; only the envelopes owned
//! by the HTTP surface live here.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Response body for the health endpoint (GET /health)
///
/// The API itself is up whenever this is served; store reachability is
/// reported separately.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Always "healthy"
    pub status: String,
    pub message: String,
    pub redis_connected: bool,
    pub cache_available: bool,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn new(store_reachable: bool) -> Self {
        Self {
            status: "healthy".to_string(),
            message: "API is running".to_string(),
            redis_connected: store_reachable,
            cache_available: store_reachable,
            timestamp: Utc::now(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
