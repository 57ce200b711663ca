//! Shared test fixtures: a deterministic embedder and a mock Gemini server.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Router,
};
use praxis::assistant::Assistant;
use praxis::chunk::split_document;
use praxis::config::GenerationConfig;
use praxis::embedding::Embedder;
use praxis::error::Result;
use praxis::generation::GeminiClient;
use praxis::knowledge::KnowledgeBase;

pub const DIMS: usize = 64;

/// Hashed bag-of-words embedder. Deterministic, no model download.
pub struct KeywordEmbedder;

impl KeywordEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; DIMS];
        for token in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            // FNV-1a
            let mut h: u64 = 0xcbf29ce484222325;
            for b in token.bytes() {
                h ^= b as u64;
                h = h.wrapping_mul(0x100000001b3);
            }
            v[(h % DIMS as u64) as usize] += 1.0;
        }
        v
    }
}

impl Embedder for KeywordEmbedder {
    fn model_name(&self) -> &str {
        "keyword-test"
    }
    fn dims(&self) -> usize {
        DIMS
    }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }
}

/// A request captured by the mock server.
#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub api_key: Option<String>,
    pub body: serde_json::Value,
}

/// What the mock server answers with.
#[derive(Clone)]
pub struct MockReply {
    pub status: StatusCode,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockReply {
    pub fn text(reply: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: serde_json::json!({
                "candidates": [{ "content": { "parts": [{ "text": reply }] } }]
            })
            .to_string(),
            delay: None,
        }
    }

    pub fn status(status: u16, body: &str) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn raw(body: &str) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.to_string(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    captured: Arc<Mutex<Vec<Captured>>>,
}

/// A local stand-in for the Gemini API.
pub struct MockGemini {
    pub base_url: String,
    pub captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockGemini {
    pub async fn start(reply: MockReply) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            reply,
            captured: captured.clone(),
        };
        let app = Router::new().fallback(mock_handler).with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            captured,
        }
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.captured.lock().unwrap().clone()
    }

    pub fn generation_config(&self, timeout_secs: u64) -> GenerationConfig {
        GenerationConfig {
            base_url: self.base_url.clone(),
            timeout_secs,
            ..GenerationConfig::default()
        }
    }
}

async fn mock_handler(
    State(state): State<MockState>,
    uri: axum::http::Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.captured.lock().unwrap().push(Captured {
        path: uri.path().to_string(),
        api_key: headers
            .get("x-goog-api-key")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_str(&body).unwrap_or(serde_json::Value::Null),
    });

    if let Some(delay) = state.reply.delay {
        tokio::time::sleep(delay).await;
    }

    (state.reply.status, state.reply.body.clone())
}

/// Build an assistant over `document`, talking to `mock`.
pub fn assistant_for(document: &str, mock: &MockGemini, timeout_secs: u64) -> Assistant {
    let embedder: Arc<dyn Embedder> = Arc::new(KeywordEmbedder);
    let chunks = split_document(document, "---");
    let kb = KnowledgeBase::build(chunks, embedder.as_ref(), "---").unwrap();
    let client = GeminiClient::new(&mock.generation_config(timeout_secs), "test-key".into()).unwrap();
    Assistant::new(Arc::new(kb), embedder, Arc::new(client), 2)
}

pub const PORTFOLIO: &str = "\
# Education
Prabhu studied computer science and engineering at university.
---
# Skills
Prabhu writes Rust, Python and TypeScript.
---
# Projects
Prabhu built PRAXIS, a portfolio chat assistant.
";
