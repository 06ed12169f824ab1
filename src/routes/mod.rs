//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - Static admin SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/taxonomy", get(http::http_taxonomy))
        .route(
            "/api/v1/questions",
            get(http::http_list_questions).post(http::http_save_question),
        )
        .route("/api/v1/questions/recent", get(http::http_recent))
        .route("/api/v1/questions/next_id", get(http::http_next_id))
        .route("/api/v1/questions/:q_id", get(http::http_get_question))
        .route("/api/v1/questions/:q_id/publish", post(http::http_toggle_published))
        .route("/api/v1/codes/generate", post(http::http_generate_codes))
        .route("/api/v1/codes/reconcile", post(http::http_reconcile_codes))
        .route("/api/v1/stats", get(http::http_stats))
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
        // Frontend fallback
        .fallback_service(static_service)
}
