//! HTTP API for the portfolio chat widget.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Static liveness message |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `POST` | `/api/chat` | `{ "message" }` in, `{ "reply" }` out |
//!
//! # Error Contract
//!
//! `/api/chat` answers `200 OK` for every well-formed request. Generation
//! and retrieval failures are reported in the `reply` text, never as a
//! status code. Only a body that does not deserialize into
//! [`ChatRequest`] is rejected (by axum's JSON extractor, with a 4xx).
//!
//! # CORS
//!
//! Only the origins in `[server].cors_origins` are allowed, with any
//! method, any header, and credentials.

use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::assistant::Assistant;
use crate::config::Config;

pub const ROOT_MESSAGE: &str = "PRAXIS AI Assistant API (Direct Gemini Version) is live.";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
}

/// JSON response body for `GET /health`.
#[derive(Serialize)]
struct HealthResponse {
    /// Always `"ok"` when the server is running.
    status: &'static str,
    /// The crate version from `Cargo.toml`.
    version: &'static str,
    /// Number of chunks in the knowledge base.
    chunks: usize,
}

/// Build the CORS layer for a fixed list of origins.
///
/// Origins that are not valid header values are skipped with a warning.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    // Credentials rule out the `*` wildcard, so methods and headers are mirrored.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Build the router with all routes and layers.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/api/chat", post(handle_chat))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_server(config: &Config, assistant: Arc<Assistant>) -> anyhow::Result<()> {
    let app = router(AppState { assistant }, &config.server.cors_origins);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "PRAXIS server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: ROOT_MESSAGE,
    })
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        chunks: state.assistant.knowledge().len(),
    })
}

/// Handler for `POST /api/chat`.
async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let reply = state.assistant.reply(&request.message).await;
    tracing::debug!(outcome = ?reply.outcome, "chat reply");
    Json(ChatResponse { reply: reply.text })
}
