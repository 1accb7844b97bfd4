use crate::handlers;
use axum::{
    Router as AxumRouter,
    routing::{get, post},
};
use std::sync::Arc;
use tally_core::config::{ReportConfig, ServerConfig};
use tally_core::log::RequestLog;
use tally_core::registry::RouteRegistry;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared state for the report API.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RouteRegistry>,
    pub log: Arc<dyn RequestLog>,
    pub report: ReportConfig,
}

/// Build the Axum router with all report API routes.
pub fn build_router(state: AppState) -> AxumRouter {
    let api = AxumRouter::new()
        // Health
        .route("/health", get(handlers::health::health_check))
        // Usage reports
        .route("/usage", get(handlers::usage::usage_report))
        .route("/usage/summary", get(handlers::usage::usage_summary))
        // Request ingest (written through by the hosting gateway)
        .route("/requests", post(handlers::ingest::record_request));

    AxumRouter::new()
        .nest("/tally", api)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the report API server.
pub async fn start(config: ServerConfig, state: AppState) -> anyhow::Result<()> {
    if !config.enabled {
        info!("Report API disabled");
        return Ok(());
    }

    let addr = config.addr;
    let app = build_router(state);

    info!(addr = %addr, "Starting report API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
