//! Router assembly: HTTP endpoints, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - CORS (allow any origin/method/headers), adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(http::http_health))
        // Catalog
        .route("/api/v1/categories", get(http::http_list_categories))
        .route("/api/v1/categories/:id", get(http::http_get_category))
        // Progress
        .route("/api/v1/progress", get(http::http_get_progress))
        .route("/api/v1/progress/summary", get(http::http_get_summary))
        .route("/api/v1/progress/toggle", post(http::http_post_toggle))
        .route("/api/v1/progress/reset", post(http::http_post_reset))
        // Generated packages
        .route("/api/v1/packages", post(http::http_post_package))
        .route("/api/v1/packages/generate", post(http::http_post_generate))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
