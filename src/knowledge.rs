//! In-memory knowledge base and similarity retriever.
//!
//! A [`KnowledgeBase`] pairs every [`Chunk`] with its embedding by position.
//! It is built once at startup, never mutated, and shared read-only across
//! requests behind an `Arc`, so concurrent retrieval needs no locking.
//!
//! Retrieval is brute-force cosine similarity over all chunk vectors. The
//! documents this serves hold tens of sections, not millions.

use crate::chunk::{join_sections, Chunk};
use crate::embedding::{cosine_similarity, Embedder};
use crate::error::{Error, Result};

/// A chunk paired with its similarity to a query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// Chunks and their embeddings, index-aligned.
#[derive(Debug)]
pub struct KnowledgeBase {
    chunks: Vec<Chunk>,
    embeddings: Vec<Vec<f32>>,
    separator: String,
}

impl KnowledgeBase {
    /// Embed every chunk in one batch and build the knowledge base.
    pub fn build(chunks: Vec<Chunk>, embedder: &dyn Embedder, separator: &str) -> Result<Self> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        tracing::info!(
            count = texts.len(),
            model = embedder.model_name(),
            "creating embeddings for the knowledge base"
        );
        let embeddings = embedder.embed_batch(&texts)?;
        let kb = Self::from_parts(chunks, embeddings, separator)?;
        tracing::info!(count = kb.len(), "embeddings created");
        Ok(kb)
    }

    /// Assemble a knowledge base from precomputed embeddings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KnowledgeMismatch`] unless there is exactly one
    /// embedding per chunk.
    pub fn from_parts(
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
        separator: &str,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(Error::KnowledgeMismatch {
                chunks: chunks.len(),
                embeddings: embeddings.len(),
            });
        }
        Ok(Self {
            chunks,
            embeddings,
            separator: separator.to_string(),
        })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Rank chunks by cosine similarity to `query`, highest first, and keep
    /// at most `top_k`.
    ///
    /// Equal scores keep document order (lower chunk index first).
    pub fn retrieve(&self, query: &[f32], top_k: usize) -> Vec<ScoredChunk<'_>> {
        let mut scored: Vec<ScoredChunk<'_>> = self
            .chunks
            .iter()
            .zip(self.embeddings.iter())
            .map(|(chunk, vector)| ScoredChunk {
                chunk,
                score: cosine_similarity(query, vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.chunk.index.cmp(&b.chunk.index))
        });
        scored.truncate(top_k);
        scored
    }

    /// Retrieve the `top_k` best chunks and join their text with the
    /// separator on its own line.
    pub fn context_for(&self, query: &[f32], top_k: usize) -> String {
        let hits = self.retrieve(query, top_k);
        for hit in &hits {
            tracing::debug!(index = hit.chunk.index, score = hit.score, "retrieved chunk");
        }
        join_sections(hits.iter().map(|h| h.chunk.text.as_str()), &self.separator)
    }
}
