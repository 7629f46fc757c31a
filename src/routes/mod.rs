//! Router assembly: HTTP endpoints, body limit, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use uuid::Uuid;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - `/transcribe`, `/quiz`, `/summary`, `/flashcards`, `/health`
/// - the `/api/...` paths older clients call, routed to the same handlers
/// - a request body limit sized for image uploads
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, request id, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(http::http_root))
        .route("/health", get(http::http_health))
        .route("/transcribe", post(http::http_transcribe))
        .route("/quiz", post(http::http_quiz))
        .route("/summary", post(http::http_summary))
        .route("/flashcards", post(http::http_flashcards))
        .route("/api/scan", post(http::http_transcribe))
        .route("/api/generate_quiz", post(http::http_quiz))
        .route("/api/summary", post(http::http_summary))
        .route("/api/generate_flashcards", post(http::http_flashcards))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// The request id ties together the log lines of one request, including the
/// concurrent completions of a quiz.
fn request_span(req: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %Uuid::new_v4(),
    )
}
