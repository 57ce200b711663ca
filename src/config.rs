//! TOML configuration.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) yields a working configuration that reads `./data/prabhu_data.md`,
//! embeds with `all-minilm-l6-v2`, and talks to Gemini on
//! `generativelanguage.googleapis.com`.
//!
//! ```toml
//! [knowledge]
//! path = "./data/prabhu_data.md"
//! separator = "---"
//!
//! [embedding]
//! model = "all-minilm-l6-v2"
//!
//! [retrieval]
//! top_k = 2
//!
//! [generation]
//! model = "gemini-1.5-flash-latest"
//! api_key_env = "GOOGLE_API_KEY"
//! temperature = 0.3
//!
//! [server]
//! bind = "127.0.0.1:8000"
//! cors_origins = ["http://localhost:3000", "http://localhost:5173"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub knowledge: KnowledgeConfig,
    pub embedding: EmbeddingConfig,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct KnowledgeConfig {
    /// Source document, read once at startup.
    #[serde(default = "default_knowledge_path")]
    pub path: PathBuf,
    /// Section marker. A line ending in this token closes a chunk.
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            path: default_knowledge_path(),
            separator: default_separator(),
        }
    }
}

fn default_knowledge_path() -> PathBuf {
    PathBuf::from("./data/prabhu_data.md")
}
fn default_separator() -> String {
    "---".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            batch_size: default_batch_size(),
        }
    }
}

fn default_embedding_model() -> String {
    "all-minilm-l6-v2".to_string()
}
fn default_batch_size() -> usize {
    64
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

fn default_top_k() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_generation_model")]
    pub model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_sampling_top_k")]
    pub top_k: u32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_generation_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            top_k: default_sampling_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}
fn default_generation_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}
fn default_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_sampling_top_k() -> u32 {
    1
}
fn default_top_p() -> f32 {
    1.0
}
fn default_max_output_tokens() -> u32 {
    2048
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: default_cors_origins(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".to_string()
}
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

impl GenerationConfig {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> crate::error::Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(crate::error::Error::MissingApiKey(self.api_key_env.clone())),
        }
    }
}

/// Load configuration from `path`.
///
/// A missing file is not an error: defaults are used and a warning is
/// logged. A file that exists but fails to parse or validate is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config(&content)
}

/// Parse and validate a TOML configuration string.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.knowledge.separator.trim().is_empty() {
        anyhow::bail!("knowledge.separator must not be empty");
    }

    if config.retrieval.top_k < 1 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if config.embedding.batch_size < 1 {
        anyhow::bail!("embedding.batch_size must be >= 1");
    }

    let generation = &config.generation;
    if generation.timeout_secs < 1 {
        anyhow::bail!("generation.timeout_secs must be >= 1");
    }
    if !(0.0..=2.0).contains(&generation.temperature) {
        anyhow::bail!("generation.temperature must be in [0.0, 2.0]");
    }
    if !(0.0..=1.0).contains(&generation.top_p) {
        anyhow::bail!("generation.top_p must be in [0.0, 1.0]");
    }
    if generation.max_output_tokens < 1 {
        anyhow::bail!("generation.max_output_tokens must be >= 1");
    }

    // A credentialed CORS layer cannot use a wildcard origin.
    if config.server.cors_origins.iter().any(|o| o.trim() == "*") {
        anyhow::bail!("server.cors_origins must list explicit origins, not \"*\"");
    }

    Ok(())
}
