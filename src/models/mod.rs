//! Request and Response models for the dashboard cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{BulkInvalidateRequest, ComponentParams, WarmParams};
pub use responses::{ErrorResponse, HealthResponse};
