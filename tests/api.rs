//! HTTP API integration tests.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use praxis::assistant::{FAILURE_REPLY, REMOTE_FAILURE_REPLY};
use praxis::generation::PLACEHOLDER_REPLY;
use praxis::guardrail::{GREETING_REPLY, IDENTITY_REPLY, PRAXIS_REPLY};
use praxis::server::{router, AppState, ROOT_MESSAGE};
use tower::ServiceExt;

mod common;
use common::{assistant_for, MockGemini, MockReply, PORTFOLIO};

fn cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn build_test_router(document: &str, mock: &MockGemini) -> Router {
    let assistant = Arc::new(assistant_for(document, mock, 60));
    router(AppState { assistant }, &cors_origins())
}

async fn chat(app: Router, message: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({ "message": message }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json["reply"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_root_endpoint() {
    let mock = MockGemini::start(MockReply::text("unused")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], ROOT_MESSAGE);
}

#[tokio::test]
async fn test_health_endpoint() {
    let mock = MockGemini::start(MockReply::text("unused")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["chunks"], 3);
}

#[tokio::test]
async fn test_greeting_shortcut() {
    let mock = MockGemini::start(MockReply::text("unused")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let (status, reply) = chat(app, "hello").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        reply,
        "Hello! How can I assist you with information about Prabhu today?"
    );
    assert_eq!(reply, GREETING_REPLY);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_praxis_meaning_shortcut() {
    let mock = MockGemini::start(MockReply::text("unused")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let (status, reply) = chat(app, "what does praxis stand for").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, PRAXIS_REPLY);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_identity_shortcut_ignores_rest_of_query() {
    let mock = MockGemini::start(MockReply::text("unused")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let (_, reply) = chat(app, "Which projects? Also, WHO ARE YOU?").await;
    assert_eq!(reply, IDENTITY_REPLY);
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_generated_reply() {
    let mock = MockGemini::start(MockReply::text("  Prabhu writes Rust.  ")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let (status, reply) = chat(app, "Does Prabhu write Rust or Python?").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, "Prabhu writes Rust.");

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(
        req.path,
        "/v1beta/models/gemini-1.5-flash-latest:generateContent"
    );
    assert_eq!(req.api_key.as_deref(), Some("test-key"));

    let prompt = req.body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("Query: does prabhu write rust or python?"));
    // best-matching section comes first
    assert!(prompt.contains("Context: # Skills\nPrabhu writes Rust, Python and TypeScript."));

    let cfg = &req.body["generationConfig"];
    assert_eq!(cfg["topK"], 1);
    assert_eq!(cfg["maxOutputTokens"], 2048);
}

#[tokio::test]
async fn test_end_to_end_quota_error_is_200() {
    let mock = MockGemini::start(MockReply::status(429, "RESOURCE_EXHAUSTED")).await;
    let app = build_test_router("A---\nB", &mock);

    let (status, reply) = chat(app, "tell me something interesting").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, REMOTE_FAILURE_REPLY);

    // both chunks retrieved (equal scores keep document order)
    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let prompt = requests[0].body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap();
    assert!(prompt.contains("Context: A\n---\nB\n\n"));
}

#[tokio::test]
async fn test_server_error_uses_quota_reply() {
    let mock = MockGemini::start(MockReply::status(503, "unavailable")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let (status, reply) = chat(app, "where did prabhu study").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, REMOTE_FAILURE_REPLY);
}

#[tokio::test]
async fn test_non_json_response_uses_generic_reply() {
    let mock = MockGemini::start(MockReply::raw("<html>oops</html>")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let (status, reply) = chat(app, "where did prabhu study").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, FAILURE_REPLY);
}

#[tokio::test]
async fn test_unexpected_shape_uses_placeholder() {
    let mock = MockGemini::start(MockReply::raw(r#"{"candidates": []}"#)).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let (status, reply) = chat(app, "where did prabhu study").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, PLACEHOLDER_REPLY);
}

#[tokio::test]
async fn test_timeout_uses_generic_reply() {
    let mock =
        MockGemini::start(MockReply::text("late").delayed(Duration::from_secs(5))).await;
    let assistant = Arc::new(assistant_for(PORTFOLIO, &mock, 1));
    let app = router(AppState { assistant }, &cors_origins());

    let (status, reply) = chat(app, "where did prabhu study").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, FAILURE_REPLY);
}

#[tokio::test]
async fn test_unreachable_api_uses_generic_reply() {
    let mock = MockGemini::start(MockReply::text("unused")).await;
    let mut config = mock.generation_config(5);
    // nothing listens on port 9 of the loopback interface
    config.base_url = "http://127.0.0.1:9".to_string();

    let embedder: Arc<dyn praxis::embedding::Embedder> = Arc::new(common::KeywordEmbedder);
    let chunks = praxis::chunk::split_document(PORTFOLIO, "---");
    let kb = praxis::knowledge::KnowledgeBase::build(chunks, embedder.as_ref(), "---").unwrap();
    let client = praxis::generation::GeminiClient::new(&config, "k".into()).unwrap();
    let assistant = Arc::new(praxis::assistant::Assistant::new(
        Arc::new(kb),
        embedder,
        Arc::new(client),
        2,
    ));
    let app = router(AppState { assistant }, &cors_origins());

    let (status, reply) = chat(app, "where did prabhu study").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply, FAILURE_REPLY);
}

#[tokio::test]
async fn test_missing_message_field_is_rejected() {
    let mock = MockGemini::start(MockReply::text("unused")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/chat")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"text": "hi"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let mock = MockGemini::start(MockReply::text("unused")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/chat")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin() {
    let mock = MockGemini::start(MockReply::text("unused")).await;
    let app = build_test_router(PORTFOLIO, &mock);

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/chat")
                .header(header::ORIGIN, "https://evil.example")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
}
