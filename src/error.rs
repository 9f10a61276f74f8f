//! Error types for the sentiment cache
//!
//! Store faults (`StoreError`) are recovered where they happen and degrade
//! to "uncached". Producer faults (`ProducerError`) always reach the caller.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Store Error ==
/// Failure talking to the backing key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection was never established or has been lost
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Connect or command exceeded the configured bound
    #[error("Store operation timed out after {0:?}")]
    Timeout(Duration),

    /// Value could not be encoded to or decoded from JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Command rejected by the backend
    #[error("Backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_connection_refusal() || err.is_connection_dropped() {
            StoreError::Unavailable(err.to_string())
        } else if err.is_timeout() {
            StoreError::Backend(format!("timeout: {}", err))
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

/// Result type for store-facing operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Producer Error ==
/// Failure raised by a producer (the expensive computation behind a cache miss).
///
/// Never cached and never swallowed by the cache layer.
#[derive(Error, Debug)]
#[error(transparent)]
pub struct ProducerError(#[from] anyhow::Error);

impl ProducerError {
    /// Builds a producer error from a plain message.
    pub fn msg<M>(message: M) -> Self
    where
        M: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
    {
        Self(anyhow::Error::msg(message))
    }
}

// == Api Error ==
/// Error type returned by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested data does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The underlying computation failed
    #[error("Producer failed: {0}")]
    Producer(#[from] ProducerError),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Producer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for HTTP handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_error_keeps_message() {
        let err = ProducerError::msg("aggregation pipeline failed");
        assert_eq!(err.to_string(), "aggregation pipeline failed");
    }

    #[test]
    fn test_serialization_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_api_error_status_codes() {
        let cases = [
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::InvalidRequest("x".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Producer(ProducerError::msg("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
