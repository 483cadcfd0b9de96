use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{cors, rest, AppState};

pub fn router(state: Arc<AppState>, allowed_origins: &[String], development: bool) -> Router {
    Router::new()
        .route("/api/health", get(rest::health))
        .route("/api/today", get(rest::today))
        .route("/api/date/{date}", get(rest::by_date))
        .route("/api/history", get(rest::history))
        .route("/api/trigger", post(rest::trigger))
        .with_state(state)
        .layer(cors::layer(allowed_origins, development))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
