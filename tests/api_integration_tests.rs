//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint against the
//! in-process store and a scripted analytics source.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use sentiment_cache::{
    api::create_router,
    cache::{CacheStore, Fetched, MemoryBackend, StoreConfig},
    dashboard::{Component, DashboardQuery},
    error::ProducerError,
    source::AnalyticsSource,
    AppState, Config,
};
use serde_json::{json, Value};
use tower::ServiceExt;

// == Helper Functions ==

/// Source that echoes the request and counts calls per component.
#[derive(Default)]
struct ScriptedSource {
    failing: Vec<Component>,
    empty: Vec<Component>,
    calls: Mutex<HashMap<Component, usize>>,
}

impl ScriptedSource {
    fn calls(&self, component: Component) -> usize {
        self.calls.lock().unwrap().get(&component).copied().unwrap_or(0)
    }
}

#[async_trait]
impl AnalyticsSource for ScriptedSource {
    async fn fetch(&self, component: Component, query: &DashboardQuery) -> Fetched {
        *self.calls.lock().unwrap().entry(component).or_default() += 1;
        if self.failing.contains(&component) {
            return Err(ProducerError::msg("aggregation pipeline failed"));
        }
        if self.empty.contains(&component) {
            return Ok(None);
        }
        Ok(Some(json!({
            "component": component.name(),
            "parent_asin": query.parent_asin,
            "start_date": query.start_date,
        })))
    }
}

fn create_test_app(source: Arc<ScriptedSource>) -> Router {
    let backend = Arc::new(MemoryBackend::new(1000));
    let store = Arc::new(CacheStore::with_backend(StoreConfig::memory(), backend));
    create_router(AppState::new(&Config::default(), store, source))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

// == Health & Stats ==

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app(Arc::default());

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["redis_connected"], true);
    assert_eq!(json["cache_available"], true);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_endpoint_without_store() {
    let store = Arc::new(CacheStore::new(StoreConfig::memory()));
    let app = create_router(AppState::new(&Config::default(), store, Arc::new(ScriptedSource::default())));

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["redis_connected"], false);
}

#[tokio::test]
async fn test_stats_reflect_traffic() {
    let app = create_test_app(Arc::default());
    let uri = "/dashboard/components/summary?parent_asin=B00X";

    send(&app, "GET", uri, None).await;
    send(&app, "GET", uri, None).await;
    let (status, json) = send(&app, "GET", "/cache/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "connected");
    assert_eq!(json["keyspace_hits"], 1);
    assert_eq!(json["keyspace_misses"], 1);
    assert_eq!(json["hit_rate"], 50.0);
    assert_eq!(json["cache_efficiency"], "fair");
    assert_eq!(json["performance_status"], "good");
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_stats_when_disconnected() {
    let store = Arc::new(CacheStore::new(StoreConfig::memory()));
    let app = create_router(AppState::new(&Config::default(), store, Arc::new(ScriptedSource::default())));

    let (status, json) = send(&app, "GET", "/cache/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "disconnected");
    assert_eq!(json["performance_status"], "offline");
}

// == Dashboard Endpoints ==

#[tokio::test]
async fn test_comprehensive_is_cached() {
    let source = Arc::new(ScriptedSource::default());
    let app = create_test_app(source.clone());
    let uri = "/dashboard/comprehensive?parent_asin=B00X&start_date=2020-01-01&end_date=2020-12-31&cities=London,Leeds";

    let (status, first) = send(&app, "GET", uri, None).await;
    let (_, second) = send(&app, "GET", uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(first["product_info"]["filters"]["cities"], json!(["London", "Leeds"]));
    assert_eq!(first["summary_statistics"]["start_date"], "2020-01-01");
    assert_eq!(first["metadata"]["total_components"], 6);
    assert_eq!(source.calls(Component::Summary), 1);
}

#[tokio::test]
async fn test_comprehensive_partial_failure() {
    let source = Arc::new(ScriptedSource {
        failing: vec![Component::Timeline],
        ..ScriptedSource::default()
    });
    let app = create_test_app(source.clone());
    let uri = "/dashboard/comprehensive?parent_asin=B00X";

    let (status, json) = send(&app, "GET", uri, None).await;
    send(&app, "GET", uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["sentiment_timeline"].is_null());
    assert_eq!(json["metadata"]["partial_failures"], 1);
    // the composite was not cached, the healthy components were
    assert_eq!(source.calls(Component::Timeline), 2);
    assert_eq!(source.calls(Component::Summary), 1);
}

#[tokio::test]
async fn test_product_comprehensive() {
    let app = create_test_app(Arc::default());

    let (status, json) = send(
        &app,
        "GET",
        "/dashboard/product-comprehensive?parent_asin=B00X",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["sentiment_pie"]["component"], "sentiment_pie");
    assert_eq!(json["sentiment_distribution"]["component"], "distribution_year");
    assert_eq!(json["metadata"]["endpoint"], "product-comprehensive");
}

#[tokio::test]
async fn test_dashboard_rejects_bad_dates() {
    let app = create_test_app(Arc::default());

    let (status, json) = send(
        &app,
        "GET",
        "/dashboard/comprehensive?parent_asin=B00X&start_date=2020-13-45",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("start_date"));
}

#[tokio::test]
async fn test_component_endpoint_status_codes() {
    let source = Arc::new(ScriptedSource {
        failing: vec![Component::WordCloud],
        empty: vec![Component::SentimentMap],
        ..ScriptedSource::default()
    });
    let app = create_test_app(source);

    let (status, json) = send(
        &app,
        "GET",
        "/dashboard/components/distribution?parent_asin=B00X&period=month",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["component"], "distribution_month");

    let (status, json) = send(&app, "GET", "/dashboard/components/wordcloud?parent_asin=B00X", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json["error"].as_str().unwrap().contains("aggregation pipeline failed"));

    let (status, _) = send(&app, "GET", "/dashboard/components/sentiment_map?parent_asin=B00X", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/dashboard/components/reviews?parent_asin=B00X", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "GET",
        "/dashboard/components/distribution?parent_asin=B00X&period=week",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// == Cache Administration ==

#[tokio::test]
async fn test_invalidate_forces_recompute() {
    let source = Arc::new(ScriptedSource::default());
    let app = create_test_app(source.clone());
    let uri = "/dashboard/comprehensive?parent_asin=B00X";
    send(&app, "GET", uri, None).await;

    let (status, report) = send(&app, "POST", "/cache/invalidate/B00X", None).await;
    send(&app, "GET", uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["entity_id"], "B00X");
    assert_eq!(report["deleted_keys"], 7);
    assert_eq!(report["status"], "success");
    assert!(report["timestamp"].is_string());
    assert_eq!(source.calls(Component::Summary), 2);
}

#[tokio::test]
async fn test_invalidate_trims_padded_id() {
    let source = Arc::new(ScriptedSource::default());
    let app = create_test_app(source.clone());
    let uri = "/dashboard/components/summary?parent_asin=B00X";
    send(&app, "GET", uri, None).await;

    let (status, report) = send(&app, "POST", "/cache/invalidate/%20B00X", None).await;
    send(&app, "GET", uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["entity_id"], "B00X");
    assert_eq!(report["deleted_keys"], 1);
    assert_eq!(source.calls(Component::Summary), 2);

    let (status, _) = send(&app, "POST", "/cache/invalidate/%20", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bulk_invalidate() {
    let app = create_test_app(Arc::default());
    send(&app, "GET", "/dashboard/components/summary?parent_asin=B001", None).await;
    send(&app, "GET", "/dashboard/components/summary?parent_asin=B002", None).await;

    let (status, report) = send(
        &app,
        "POST",
        "/cache/invalidate",
        Some(r#"{"parent_asins": ["B001", "B002", "B003"]}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_entities"], 3);
    assert_eq!(report["total_deleted_keys"], 2);
    assert_eq!(report["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_bulk_invalidate_rejects_empty_list() {
    let app = create_test_app(Arc::default());

    let (status, json) = send(&app, "POST", "/cache/invalidate", Some(r#"{"parent_asins": []}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("parent_asins"));
}

#[tokio::test]
async fn test_warm_then_serve_from_cache() {
    let source = Arc::new(ScriptedSource {
        failing: vec![Component::SentimentMap],
        ..ScriptedSource::default()
    });
    let app = create_test_app(source.clone());

    let (status, report) = send(
        &app,
        "POST",
        "/cache/warm/B00X?start_date=2020-01-01&end_date=2020-12-31",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["entity_id"], "B00X");
    assert_eq!(report["total"], 6);
    assert_eq!(report["successful"], 5);
    assert_eq!(report["failed"], 1);

    let (_, json) = send(
        &app,
        "GET",
        "/dashboard/components/summary?parent_asin=B00X&start_date=2020-01-01&end_date=2020-12-31",
        None,
    )
    .await;
    assert_eq!(json["start_date"], "2020-01-01");
    assert_eq!(source.calls(Component::Summary), 1);
}

#[tokio::test]
async fn test_warm_ignores_half_date_range() {
    let source = Arc::new(ScriptedSource::default());
    let app = create_test_app(source.clone());

    send(&app, "POST", "/cache/warm/B00X?start_date=2020-01-01", None).await;
    send(&app, "GET", "/dashboard/components/summary?parent_asin=B00X", None).await;

    assert_eq!(source.calls(Component::Summary), 1);
}
