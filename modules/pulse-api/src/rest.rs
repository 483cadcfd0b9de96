//! REST handlers: pure translation from HTTP to store/pipeline calls.
//! Read endpoints never expose pipeline errors; internal failures are
//! logged and surfaced as a generic 500.

use std::sync::{Arc, LazyLock};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{Duration, NaiveDate, Utc};
use regex::Regex;
use serde::Deserialize;
use tracing::error;

use pulse_store::{BriefingRecord, BriefingStore};

use crate::AppState;

const DEFAULT_HISTORY_DAYS: i64 = 30;
const MAX_HISTORY_DAYS: i64 = 365;

static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

#[derive(Deserialize)]
pub struct HistoryQuery {
    days: Option<i64>,
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn today(State(state): State<Arc<AppState>>) -> Response {
    match state.store.find_latest().await {
        Ok(Some(record)) => record_response(record),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "No briefing available yet"})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

pub async fn by_date(State(state): State<Arc<AppState>>, Path(date): Path<String>) -> Response {
    let Some(date) = parse_briefing_date(&date) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid date format. Use YYYY-MM-DD"})),
        )
            .into_response();
    };

    match state.store.find_by_date(date).await {
        Ok(Some(record)) => record_response(record),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("No briefing for {date}")})),
        )
            .into_response(),
        Err(e) => internal_error(e),
    }
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HistoryQuery>,
) -> Response {
    let days = params
        .days
        .unwrap_or(DEFAULT_HISTORY_DAYS)
        .clamp(1, MAX_HISTORY_DAYS);
    let cutoff = Utc::now().date_naive() - Duration::days(days);

    match state.store.find_range(cutoff).await {
        Ok(summaries) => Json(serde_json::json!({"data": summaries})).into_response(),
        Err(e) => internal_error(e),
    }
}

pub async fn trigger(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !check_bearer(&headers, &state.trigger_secret) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "Unauthorized"})),
        )
            .into_response();
    }

    // Manual trigger: one direct run, no retry wrapper.
    match state.pipeline.run().await {
        Ok(_) => Json(serde_json::json!({"status": "triggered"})).into_response(),
        Err(e) => internal_error(e),
    }
}

/// The public record shape: the sources snapshot stays out of responses.
fn record_response(record: BriefingRecord) -> Response {
    Json(serde_json::json!({
        "date": record.date,
        "briefing": record.briefing,
        "model": record.model,
        "tokensUsed": record.tokens_used,
        "createdAt": record.created_at,
    }))
    .into_response()
}

/// Syntactic gate first (zero-padded YYYY-MM-DD), then a real-date parse,
/// before any store access.
fn parse_briefing_date(raw: &str) -> Option<NaiveDate> {
    if !DATE_SHAPE.is_match(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Exact bearer-credential match in constant time. An empty configured
/// secret disables the endpoint entirely.
fn check_bearer(headers: &HeaderMap, secret: &str) -> bool {
    if secret.is_empty() {
        return false;
    }
    let Some(auth) = headers.get(header::AUTHORIZATION) else {
        return false;
    };
    let Ok(auth) = auth.to_str() else {
        return false;
    };
    constant_time_eq(auth.as_bytes(), format!("Bearer {secret}").as_bytes())
}

/// Constant-time comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

fn internal_error(e: anyhow::Error) -> Response {
    error!(error = %e, "Request handler failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "Internal Server Error"})),
    )
        .into_response()
}
