//! API Handlers
//!
//! HTTP request handlers for the cache administration and dashboard endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::cache::{
    BulkInvalidationReport, CacheManager, CacheStore, InvalidationReport, PerformanceMetrics,
    StoreConfig, TtlPolicy, WarmingReport,
};
use crate::config::Config;
use crate::dashboard::{Component, DashboardQuery, DashboardService, Period};
use crate::error::{ApiError, Result};
use crate::models::{BulkInvalidateRequest, ComponentParams, HealthResponse, WarmParams};
use crate::source::{AnalyticsSource, FileSource};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CacheStore>,
    pub dashboard: Arc<DashboardService>,
}

impl AppState {
    /// Wires the dashboard service over `store` and `source`.
    pub fn new(config: &Config, store: Arc<CacheStore>, source: Arc<dyn AnalyticsSource>) -> Self {
        let cache = CacheManager::new(store.clone(), TtlPolicy::from_config(config));
        let dashboard = DashboardService::new(cache, source, config.warm_timeout());
        Self {
            store,
            dashboard: Arc::new(dashboard),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// The store starts disconnected; the caller connects it.
    pub fn from_config(config: &Config) -> Self {
        let store = Arc::new(CacheStore::new(StoreConfig::from_config(config)));
        let source = Arc::new(FileSource::new(&config.data_dir));
        Self::new(config, store, source)
    }
}

/// Parses and validates the shared dashboard filters.
fn checked(query: DashboardQuery) -> Result<DashboardQuery> {
    let query = query.normalized();
    match query.validate() {
        Some(message) => Err(ApiError::InvalidRequest(message)),
        None => Ok(query),
    }
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let reachable = state.store.health_check().await;
    Json(HealthResponse::new(reachable))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<PerformanceMetrics> {
    let stats = state.store.stats().await;
    Json(PerformanceMetrics::from_stats(stats))
}

/// Handler for POST /cache/invalidate/:parent_asin
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(parent_asin): Path<String>,
) -> Result<Json<InvalidationReport>> {
    let query = checked(DashboardQuery::new(parent_asin))?;
    Ok(Json(state.dashboard.invalidate(&query.parent_asin).await))
}

/// Handler for POST /cache/invalidate
pub async fn bulk_invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<BulkInvalidateRequest>,
) -> Result<Json<BulkInvalidationReport>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::InvalidRequest(error_msg));
    }

    let parent_asins: Vec<String> = req
        .parent_asins
        .iter()
        .map(|asin| asin.trim().to_string())
        .collect();
    Ok(Json(state.dashboard.bulk_invalidate(&parent_asins).await))
}

/// Handler for POST /cache/warm/:parent_asin
///
/// Dates apply only when both `start_date` and `end_date` are given.
pub async fn warm_handler(
    State(state): State<AppState>,
    Path(parent_asin): Path<String>,
    Query(params): Query<WarmParams>,
) -> Result<Json<WarmingReport>> {
    let mut query = DashboardQuery::new(parent_asin);
    if let Some((start, end)) = params.date_range() {
        query = query.with_dates(start, end);
    }
    let query = checked(query)?;

    info!("Warming cache for {}", query.parent_asin);
    Ok(Json(state.dashboard.warm(&query).await))
}

/// Handler for GET /dashboard/comprehensive
pub async fn comprehensive_handler(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Value>> {
    let query = checked(query)?;
    Ok(Json(state.dashboard.comprehensive(&query).await))
}

/// Handler for GET /dashboard/product-comprehensive
pub async fn product_comprehensive_handler(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<Value>> {
    let query = checked(query)?;
    Ok(Json(state.dashboard.product_comprehensive(&query).await))
}

/// Handler for GET /dashboard/components/:component
pub async fn component_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DashboardQuery>,
    Query(params): Query<ComponentParams>,
) -> Result<Json<Value>> {
    let period = params
        .period
        .as_deref()
        .map(str::parse::<Period>)
        .transpose()
        .map_err(ApiError::InvalidRequest)?;
    let component = Component::parse(&name, period)
        .ok_or_else(|| ApiError::NotFound(format!("unknown component '{}'", name)))?;
    let query = checked(query)?;

    match state.dashboard.component(component, &query).await? {
        Some(value) => Ok(Json(value)),
        None => Err(ApiError::NotFound(format!(
            "no {} data for {}",
            component, query.parent_asin
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MemoryBackend, StoreStatus};
    use tempfile::TempDir;

    fn state_with_data(dir: &TempDir) -> AppState {
        let config = Config::default();
        let backend = Arc::new(MemoryBackend::new(100));
        let store = Arc::new(CacheStore::with_backend(StoreConfig::memory(), backend));
        AppState::new(&config, store, Arc::new(FileSource::new(dir.path())))
    }

    fn write_document(dir: &TempDir) {
        std::fs::write(
            dir.path().join("B00X.json"),
            r#"{"summary": {"total_reviews": 4}, "distribution_month": [{"month": "2020-01"}]}"#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_health_handler_reports_store() {
        let dir = TempDir::new().unwrap();
        let response = health_handler(State(state_with_data(&dir))).await;
        assert_eq!(response.status, "healthy");
        assert!(response.redis_connected);

        let disconnected = AppState::from_config(&Config::default());
        let response = health_handler(State(disconnected)).await;
        assert!(!response.redis_connected);
        assert!(!response.cache_available);
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let dir = TempDir::new().unwrap();
        let response = stats_handler(State(state_with_data(&dir))).await;
        assert_eq!(response.stats.status, StoreStatus::Connected);
    }

    #[tokio::test]
    async fn test_component_handler() {
        let dir = TempDir::new().unwrap();
        write_document(&dir);
        let state = state_with_data(&dir);

        let result = component_handler(
            State(state.clone()),
            Path("distribution".to_string()),
            Query(DashboardQuery::new("B00X")),
            Query(ComponentParams {
                period: Some("month".to_string()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.0[0]["month"], "2020-01");

        let missing = component_handler(
            State(state),
            Path("timeline".to_string()),
            Query(DashboardQuery::new("B00X")),
            Query(ComponentParams::default()),
        )
        .await;
        assert!(matches!(missing, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_component_handler_rejects_bad_input() {
        let dir = TempDir::new().unwrap();
        let state = state_with_data(&dir);

        let bad_period = component_handler(
            State(state.clone()),
            Path("distribution".to_string()),
            Query(DashboardQuery::new("B00X")),
            Query(ComponentParams {
                period: Some("week".to_string()),
            }),
        )
        .await;
        assert!(matches!(bad_period, Err(ApiError::InvalidRequest(_))));

        let unknown = component_handler(
            State(state.clone()),
            Path("reviews".to_string()),
            Query(DashboardQuery::new("B00X")),
            Query(ComponentParams::default()),
        )
        .await;
        assert!(matches!(unknown, Err(ApiError::NotFound(_))));

        let bad_date = component_handler(
            State(state),
            Path("summary".to_string()),
            Query(DashboardQuery::new("B00X").with_dates("yesterday", "2020-01-01")),
            Query(ComponentParams::default()),
        )
        .await;
        assert!(matches!(bad_date, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_bulk_invalidate_handler_validates() {
        let dir = TempDir::new().unwrap();
        let req = BulkInvalidateRequest {
            parent_asins: vec![],
        };

        let result = bulk_invalidate_handler(State(state_with_data(&dir)), Json(req)).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_warm_then_invalidate() {
        let dir = TempDir::new().unwrap();
        write_document(&dir);
        let state = state_with_data(&dir);

        let report = warm_handler(
            State(state.clone()),
            Path("B00X".to_string()),
            Query(WarmParams::default()),
        )
        .await
        .unwrap();
        assert_eq!(report.successful, 6);
        assert_eq!(report.failed, 0);

        // only summary and monthly distribution produced data
        let report = invalidate_handler(State(state), Path("B00X".to_string()))
            .await
            .unwrap();
        assert_eq!(report.deleted_keys, 2);
    }

    #[tokio::test]
    async fn test_invalidate_handler_trims_id() {
        let dir = TempDir::new().unwrap();
        write_document(&dir);
        let state = state_with_data(&dir);
        component_handler(
            State(state.clone()),
            Path("summary".to_string()),
            Query(DashboardQuery::new("B00X")),
            Query(ComponentParams::default()),
        )
        .await
        .unwrap();

        let report = invalidate_handler(State(state.clone()), Path(" B00X ".to_string()))
            .await
            .unwrap();
        assert_eq!(report.entity_id, "B00X");
        assert_eq!(report.deleted_keys, 1);

        let blank = invalidate_handler(State(state), Path("  ".to_string())).await;
        assert!(matches!(blank, Err(ApiError::InvalidRequest(_))));
    }
}
