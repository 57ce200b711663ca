//! # PRAXIS
//!
//! A retrieval-augmented chat backend that answers questions about one
//! person from a hand-written knowledge document.
//!
//! At startup the document is split into sections, each section is embedded
//! with a local sentence-embedding model, and the vectors are kept in
//! memory. Each chat message is then answered by:
//!
//! ```text
//! ┌───────────┐   ┌──────────┐   ┌───────────┐   ┌──────────┐   ┌──────────┐
//! │ Guardrail │──▶│  Embed   │──▶│ Retrieve  │──▶│  Prompt  │──▶│  Gemini  │
//! │ shortcuts │   │  query   │   │  top-k    │   │ template │   │   API    │
//! └───────────┘   └──────────┘   └───────────┘   └──────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GOOGLE_API_KEY=...
//! praxis chunks                       # inspect how the document was split
//! praxis ask "where did prabhu study" # one-shot answer
//! praxis serve                        # start the HTTP API
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`chunk`] | Document loading and section splitting |
//! | [`embedding`] | Embedder trait, fastembed model, cosine similarity |
//! | [`knowledge`] | In-memory knowledge base and retriever |
//! | [`guardrail`] | Canned replies for identity and greeting queries |
//! | [`prompt`] | Prompt template |
//! | [`generation`] | Gemini API client |
//! | [`assistant`] | Request handler tying the pipeline together |
//! | [`server`] | HTTP API |

pub mod assistant;
pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod guardrail;
pub mod knowledge;
pub mod prompt;
pub mod server;

use std::sync::Arc;

use assistant::Assistant;
use config::Config;
use generation::GeminiClient;
use knowledge::KnowledgeBase;

/// Load the document, embed it, and wire up the assistant.
///
/// Every failure here is fatal: missing document, missing API key, or an
/// embedding model that cannot be loaded. The key is checked first so a
/// misconfigured deployment fails before downloading a model.
pub fn build_assistant(config: &Config) -> anyhow::Result<Assistant> {
    let api_key = config.generation.api_key()?;
    let chunks = chunk::load_chunks(&config.knowledge.path, &config.knowledge.separator)?;

    let embedder = embedding::create_embedder(&config.embedding)?;
    let knowledge = KnowledgeBase::build(chunks, embedder.as_ref(), &config.knowledge.separator)?;

    let generator = GeminiClient::new(&config.generation, api_key)?;

    Ok(Assistant::new(
        Arc::new(knowledge),
        embedder,
        Arc::new(generator),
        config.retrieval.top_k,
    ))
}
