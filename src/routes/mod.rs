//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
  routing::{delete, get, patch, post},
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
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers) – adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
  // Static files with SPA fallback
  let static_service = ServeDir::new("./static")
    .append_index_html_on_directories(true)
    .not_found_service(ServeFile::new("./static/index.html"));

  Router::new()
    // WebSocket
    .route("/ws", get(ws::ws_upgrade))
    // HTTP API
    .route("/api/v1/health", get(http::http_health))
    .route("/api/v1/questions", get(http::http_get_questions))
    .route("/api/v1/answer", post(http::http_post_answer))
    .route("/api/v1/review/due", get(http::http_get_review_due))
    .route("/api/v1/review/all", get(http::http_get_review_all))
    .route("/api/v1/review/remove", post(http::http_post_review_remove))
    .route("/api/v1/review/restore", post(http::http_post_review_restore))
    .route("/api/v1/stats", get(http::http_get_stats))
    .route("/api/v1/stats/practiced", post(http::http_post_practiced))
    .route("/api/v1/sets", get(http::http_get_sets).post(http::http_post_set))
    .route("/api/v1/sets/:id", patch(http::http_patch_set).delete(http::http_delete_set))
    .route("/api/v1/folders", post(http::http_post_folder))
    .route("/api/v1/folders/:id", delete(http::http_delete_folder))
    .route("/api/v1/notes", get(http::http_get_note).post(http::http_post_note))
    .route("/api/v1/export", get(http::http_get_export))
    .route("/api/v1/import", post(http::http_post_import))
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
