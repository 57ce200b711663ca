//! Gemini `generateContent` client.
//!
//! One POST per call, no retry. The request carries the prompt and the
//! fixed sampling parameters from [`GenerationConfig`]; the reply text is
//! read from `candidates[0].content.parts[0].text`.
//!
//! # Error classes
//!
//! | Failure | Variant |
//! |---------|---------|
//! | Non-2xx HTTP status | [`GenerationError::RemoteApi`] |
//! | Request timed out | [`GenerationError::Timeout`] |
//! | Connection / transport failure | [`GenerationError::Transport`] |
//! | Body is not JSON | [`GenerationError::Malformed`] |
//!
//! A JSON body without the expected fields is *not* an error: the client
//! logs a warning and returns [`PLACEHOLDER_REPLY`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use thiserror::Error;

use crate::config::GenerationConfig;

/// Returned when the API answers with JSON that holds no candidate text.
pub const PLACEHOLDER_REPLY: &str = "Sorry, I could not generate a response.";

/// Errors from the remote generation call.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The API answered with a non-success status.
    #[error("generation API error {status}: {body}")]
    RemoteApi { status: StatusCode, body: String },

    /// No response within the configured timeout.
    #[error("generation request timed out")]
    Timeout,

    /// Network or protocol failure before a status was received.
    #[error("generation request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body could not be decoded as JSON.
    #[error("malformed generation response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        // The URL is dropped so it never ends up in logs.
        let e = e.without_url();
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Transport(e)
        }
    }
}

/// Something that turns a prompt into reply text.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: SamplingConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SamplingConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

/// Client for the Gemini generative-language API.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    config: GenerationConfig,
}

impl GeminiClient {
    /// Build a client with the configured timeout.
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self, GenerationError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let endpoint = format!(
            "{}/v1beta/models/{}:generateContent",
            config.base_url.trim_end_matches('/'),
            config.model
        );

        Ok(Self {
            http,
            endpoint,
            api_key,
            config: config.clone(),
        })
    }

    /// Full `generateContent` URL, without the key.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: SamplingConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
            },
        }
    }
}

#[async_trait]
impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, %body, "generation API error");
            return Err(GenerationError::RemoteApi { status, body });
        }

        let bytes = response.bytes().await?;
        let json: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| GenerationError::Malformed(e.to_string()))?;

        Ok(extract_reply(&json))
    }
}

/// Pull `candidates[0].content.parts[0].text` out of a response, falling
/// back to [`PLACEHOLDER_REPLY`].
pub fn extract_reply(json: &serde_json::Value) -> String {
    let text = json
        .get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str());

    match text {
        Some(text) => text.trim().to_string(),
        None => {
            tracing::warn!(response = %json, "generation response has no candidate text");
            PLACEHOLDER_REPLY.to_string()
        }
    }
}
