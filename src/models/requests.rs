//! Request DTOs for the dashboard cache API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

/// Maximum number of products accepted by one bulk invalidation.
pub const MAX_BULK_INVALIDATE: usize = 100;

/// Request body for bulk invalidation (POST /cache/invalidate)
#[derive(Debug, Clone, Deserialize)]
pub struct BulkInvalidateRequest {
    pub parent_asins: Vec<String>,
}

impl BulkInvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.parent_asins.is_empty() {
            return Some("parent_asins cannot be empty".to_string());
        }
        if self.parent_asins.len() > MAX_BULK_INVALIDATE {
            return Some(format!(
                "parent_asins exceeds maximum of {} products",
                MAX_BULK_INVALIDATE
            ));
        }
        if self.parent_asins.iter().any(|asin| asin.trim().is_empty()) {
            return Some("parent_asins cannot contain empty ids".to_string());
        }
        None
    }
}

/// Query string of the warm endpoint (POST /cache/warm/:parent_asin)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarmParams {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

impl WarmParams {
    /// The date range, applied only when both bounds are given.
    pub fn date_range(&self) -> Option<(&str, &str)> {
        match (self.start_date.as_deref(), self.end_date.as_deref()) {
            (Some(start), Some(end)) if !start.is_empty() && !end.is_empty() => Some((start, end)),
            _ => None,
        }
    }
}

/// Extra query parameter of the component endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ComponentParams {
    /// `year` or `month`, for the distribution component
    #[serde(default)]
    pub period: Option<String>,
}
