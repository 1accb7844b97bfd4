use crate::server::AppState;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tally_core::report::{UsageAggregator, UsageReport};
use tally_core::TallyError;

/// Header carrying the authenticated caller identity.
///
/// Authentication itself happens upstream; the gateway forwards the
/// resolved user here.
pub const USER_HEADER: &str = "x-tally-user";

#[derive(Debug, Deserialize, Default)]
pub struct UsageQuery {
    /// Reference date for the billing windows (defaults to today, UTC).
    pub date: Option<NaiveDate>,
}

/// `GET /tally/usage` — current and previous billing-cycle usage per
/// route pattern, for the calling user.
pub async fn usage_report(
    State(state): State<AppState>,
    Query(query): Query<UsageQuery>,
    headers: HeaderMap,
) -> Result<Json<UsageReport>, (StatusCode, Json<Value>)> {
    let user = caller(&headers)?;
    let host = serving_host(&headers, &state.report.site_host);
    let today = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let aggregator = UsageAggregator::new(
        state.report.clone(),
        Arc::clone(&state.registry),
        Arc::clone(&state.log),
    );
    let report = aggregator.report(&user, &host, today).map_err(error_response)?;
    Ok(Json(report))
}

/// `GET /tally/usage/summary` — flat totals, no per-route breakdown.
pub async fn usage_summary(
    State(state): State<AppState>,
    Query(query): Query<UsageQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let user = caller(&headers)?;
    let host = serving_host(&headers, &state.report.site_host);
    let today = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let aggregator = UsageAggregator::new(
        state.report.clone(),
        Arc::clone(&state.registry),
        Arc::clone(&state.log),
    );
    let (current, previous) = aggregator.summary(&user, &host, today);
    Ok(Json(json!({ "current": current, "previous": previous })))
}

fn caller(headers: &HeaderMap) -> Result<String, (StatusCode, Json<Value>)> {
    headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| error_response(TallyError::UserRequired))
}

/// Host the request was served on, port stripped, falling back to the
/// configured site host when the header is absent.
fn serving_host(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(|h| h.split(':').next().unwrap_or(h).to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn error_response(err: TallyError) -> (StatusCode, Json<Value>) {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err.to_json_body()))
}
