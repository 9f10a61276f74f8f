//! API Routes
//!
//! Configures the Axum router with the cache and dashboard endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    bulk_invalidate_handler, component_handler, comprehensive_handler, health_handler,
    invalidate_handler, product_comprehensive_handler, stats_handler, warm_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Liveness plus store reachability
/// - `GET /cache/stats` - Store performance metrics
/// - `POST /cache/invalidate/:parent_asin` - Drop a product's entries
/// - `POST /cache/invalidate` - Drop entries of several products
/// - `POST /cache/warm/:parent_asin` - Pre-compute a product's components
/// - `GET /dashboard/comprehensive` - Full composite dashboard
/// - `GET /dashboard/product-comprehensive` - Product composite dashboard
/// - `GET /dashboard/components/:component` - A single component
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cache_routes = Router::new()
        .route("/stats", get(stats_handler))
        .route("/invalidate", post(bulk_invalidate_handler))
        .route("/invalidate/:parent_asin", post(invalidate_handler))
        .route("/warm/:parent_asin", post(warm_handler));

    let dashboard_routes = Router::new()
        .route("/comprehensive", get(comprehensive_handler))
        .route("/product-comprehensive", get(product_comprehensive_handler))
        .route("/components/:component", get(component_handler));

    Router::new()
        .route("/health", get(health_handler))
        .nest("/cache", cache_routes)
        .nest("/dashboard", dashboard_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
