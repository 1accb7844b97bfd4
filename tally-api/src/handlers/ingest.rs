use crate::server::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::log::RequestRecord;
use uuid::Uuid;

/// Body of `POST /tally/requests`.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub user: String,
    pub host: String,
    pub method: String,
    pub path: String,
    /// Defaults to the ingest time when the gateway doesn't supply one.
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
}

/// `POST /tally/requests` — append one request record to the log.
pub async fn record_request(
    State(state): State<AppState>,
    Json(body): Json<IngestRequest>,
) -> (StatusCode, Json<Value>) {
    let record = RequestRecord {
        id: Uuid::new_v4(),
        user: body.user,
        host: body.host,
        method: body.method,
        path: body.path,
        requested_at: body.requested_at.unwrap_or_else(Utc::now),
    };
    let id = record.id;
    state.log.append(record);
    (StatusCode::CREATED, Json(json!({ "id": id })))
}
