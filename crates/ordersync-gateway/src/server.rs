//! HTTP server implementation using Axum.

use axum::{Router, routing::get};
use ordersync_core::config::GatewayConfig;
use ordersync_scheduler::Dispatcher;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
#[derive(Clone)]
pub struct AppState {
    /// Profiles and pipeline used by the manual trigger.
    pub dispatcher: Arc<Dispatcher>,
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(super::routes::instructions))
        .route("/__scheduled", get(super::routes::run_scheduled))
        .route("/health", get(super::routes::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the HTTP server.
pub async fn start(config: &GatewayConfig, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🌐 Gateway listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
