//! Startup and pipeline error types.
//!
//! Failures of the remote generation call have their own type,
//! [`GenerationError`](crate::generation::GenerationError), because the
//! request handler maps them to a different reply.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for PRAXIS operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading the knowledge base or embedding text.
#[derive(Debug, Error)]
pub enum Error {
    /// The knowledge document could not be read.
    #[error("knowledge document not found at {path}: {source}")]
    DocumentMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The generation API credential is not in the environment.
    #[error("{0} not found. Set it in the environment before starting the server")]
    MissingApiKey(String),

    /// Embedding model failed to load or to embed.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Chunk and embedding counts disagree.
    #[error("knowledge base has {chunks} chunks but {embeddings} embeddings")]
    KnowledgeMismatch { chunks: usize, embeddings: usize },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
