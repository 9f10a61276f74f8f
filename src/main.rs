//! Sentiment Cache - caching layer for review-sentiment analytics
//!
//! Serves per-product dashboard aggregates through a Redis (or in-process)
//! cache with fetch-or-compute, entity invalidation and concurrent warming.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sentiment_cache::{create_router, spawn_cleanup_task, spawn_health_task, AppState, Config};

/// Main entry point for the sentiment cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the store; on failure keep serving uncached
/// 4. Start background cleanup and health tasks
/// 5. Serve until SIGINT/SIGTERM, then stop tasks and disconnect
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to info level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sentiment_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sentiment Cache Server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: backend={:?}, default_ttl={}s, component_ttl={}s, port={}",
        config.store_backend, config.default_ttl, config.component_ttl, config.server_port
    );

    let state = AppState::from_config(&config);
    if let Err(err) = state.store.connect().await {
        warn!("Starting without cache, store unavailable: {}", err);
    }

    let background = vec![
        spawn_cleanup_task(state.store.clone(), config.cleanup_interval),
        spawn_health_task(state.store.clone(), config.health_check_interval),
    ];
    info!("Background tasks started");

    let store = state.store.clone();
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(background))
        .await
        .context("server error")?;

    store.disconnect().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then aborts the background tasks.
async fn shutdown_signal(background: Vec<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    for handle in background {
        handle.abort();
    }
    warn!("Background tasks aborted");
}
