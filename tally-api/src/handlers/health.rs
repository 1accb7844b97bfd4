use crate::server::AppState;
use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "routes": state.registry.route_count(),
        "patterns": state.registry.patterns().len(),
        "log_entries": state.log.len(),
    }))
}
