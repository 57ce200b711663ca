//! Chat request handler.
//!
//! [`Assistant::reply`] runs one message through the pipeline:
//!
//! ```text
//! normalize ─▶ guardrail? ──yes──▶ canned reply
//!                  │no
//!                  ▼
//!            embed query ─▶ retrieve top-k ─▶ build prompt ─▶ generate ─▶ reply
//! ```
//!
//! It never fails. A [`GenerationError::RemoteApi`] becomes
//! [`REMOTE_FAILURE_REPLY`]; every other failure becomes
//! [`FAILURE_REPLY`] and is logged in full.

use std::sync::Arc;

use crate::embedding::Embedder;
use crate::generation::{GenerationError, Generator};
use crate::guardrail::{self, Guardrail};
use crate::knowledge::KnowledgeBase;
use crate::prompt::build_prompt;

pub const REMOTE_FAILURE_REPLY: &str =
    "Sorry, I'm having trouble connecting to my core intelligence. This might be an API quota issue.";
pub const FAILURE_REPLY: &str = "Sorry, an unexpected error occurred. Please check the server logs.";

/// How a reply was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Shortcut(Guardrail),
    Generated,
    RemoteApiFailure,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub outcome: Outcome,
}

impl Reply {
    fn new(text: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            text: text.into(),
            outcome,
        }
    }
}

/// Shared, read-only state for answering chat messages.
pub struct Assistant {
    knowledge: Arc<KnowledgeBase>,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    top_k: usize,
}

#[derive(Debug, thiserror::Error)]
enum PipelineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Embedding(#[from] crate::error::Error),
    #[error("embedding task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Assistant {
    pub fn new(
        knowledge: Arc<KnowledgeBase>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        top_k: usize,
    ) -> Self {
        Self {
            knowledge,
            embedder,
            generator,
            top_k,
        }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Answer one chat message.
    pub async fn reply(&self, message: &str) -> Reply {
        let query = guardrail::normalize(message);

        if let Some(shortcut) = guardrail::check(&query) {
            tracing::debug!(?shortcut, "guardrail matched");
            return Reply::new(shortcut.reply(), Outcome::Shortcut(shortcut));
        }

        tracing::info!(query = %query, "received query");

        match self.answer(query).await {
            Ok(text) => Reply::new(text, Outcome::Generated),
            // already logged with its body by the client
            Err(PipelineError::Generation(GenerationError::RemoteApi { .. })) => {
                Reply::new(REMOTE_FAILURE_REPLY, Outcome::RemoteApiFailure)
            }
            Err(e) => {
                tracing::error!(error = ?e, "unexpected error while answering");
                Reply::new(FAILURE_REPLY, Outcome::Failure)
            }
        }
    }

    async fn answer(&self, query: String) -> Result<String, PipelineError> {
        let embedder = Arc::clone(&self.embedder);
        let (query, vector) = tokio::task::spawn_blocking(move || {
            let vector = embedder.embed(&query);
            (query, vector)
        })
        .await?;
        let vector = vector?;

        let context = self.knowledge.context_for(&vector, self.top_k);
        let prompt = build_prompt(&context, &query);

        Ok(self.generator.generate(&prompt).await?)
    }
}
