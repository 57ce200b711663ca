//! Sentence embedding abstraction and the local fastembed model.
//!
//! Defines the [`Embedder`] trait the knowledge base and request handler
//! depend on, and [`LocalEmbedder`], which runs a pretrained sentence
//! transformer in-process via fastembed. The model is downloaded from
//! Hugging Face on first use and cached; after that, embedding runs
//! entirely offline.
//!
//! Also provides [`cosine_similarity`], used by the retriever to rank chunks.
//!
//! # Provider Selection
//!
//! Use [`create_embedder`] to build the embedder named by the configuration:
//!
//! ```rust,no_run
//! # use praxis::config::EmbeddingConfig;
//! # use praxis::embedding::create_embedder;
//! let config = EmbeddingConfig::default(); // all-minilm-l6-v2
//! let embedder = create_embedder(&config).unwrap();
//! assert_eq!(embedder.dims(), 384);
//! ```

use std::sync::Arc;

use crate::config::EmbeddingConfig;
use crate::error::{Error, Result};

/// Trait for text embedding backends.
///
/// Implementations must be deterministic: the same text always yields the
/// same vector for a given model.
pub trait Embedder: Send + Sync {
    /// Returns the model identifier (e.g. `"all-minilm-l6-v2"`).
    fn model_name(&self) -> &str;
    /// Returns the embedding vector dimensionality (e.g. `384`).
    fn dims(&self) -> usize;

    /// Embed a batch of texts, returning one vector per input in input order.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| Error::Embedding("Empty embedding response".to_string()))
    }
}

/// Resolve the vector dimensionality for a supported local model name.
pub fn model_dims(model_name: &str) -> Result<usize> {
    match model_name {
        "all-minilm-l6-v2" | "bge-small-en-v1.5" | "multilingual-e5-small" => Ok(384),
        "bge-base-en-v1.5" | "nomic-embed-text-v1" | "nomic-embed-text-v1.5"
        | "multilingual-e5-base" => Ok(768),
        "bge-large-en-v1.5" | "multilingual-e5-large" => Ok(1024),
        other => Err(Error::Config(format!(
            "Unknown local embedding model: '{}'. Supported models: \
             all-minilm-l6-v2, bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5, \
             nomic-embed-text-v1, nomic-embed-text-v1.5, \
             multilingual-e5-small, multilingual-e5-base, multilingual-e5-large",
            other
        ))),
    }
}

// ============ Local Provider (fastembed) ============

/// In-process sentence embedder backed by fastembed (ONNX Runtime).
///
/// The model is loaded once in [`LocalEmbedder::new`]. fastembed needs
/// exclusive access to its session while embedding, so the model sits
/// behind a mutex held only for the duration of one batch.
#[cfg(feature = "local-embeddings-fastembed")]
pub struct LocalEmbedder {
    model_name: String,
    dims: usize,
    batch_size: usize,
    model: std::sync::Mutex<fastembed::TextEmbedding>,
}

#[cfg(feature = "local-embeddings-fastembed")]
impl LocalEmbedder {
    /// Load the configured model.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for an unknown model name and
    /// [`Error::Embedding`] if the model cannot be downloaded or loaded.
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let dims = model_dims(&config.model)?;
        let fastembed_model = config_to_fastembed_model(&config.model)?;

        tracing::info!(model = %config.model, "loading local embedding model");
        let model = fastembed::TextEmbedding::try_new(
            fastembed::InitOptions::new(fastembed_model).with_show_download_progress(false),
        )
        .map_err(|e| Error::Embedding(format!("Failed to initialize local embedding model: {}", e)))?;
        tracing::info!(model = %config.model, dims, "embedding model loaded");

        Ok(Self {
            model_name: config.model.clone(),
            dims,
            batch_size: config.batch_size,
            model: std::sync::Mutex::new(model),
        })
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
impl Embedder for LocalEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dims(&self) -> usize {
        self.dims
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut model = self
            .model
            .lock()
            .map_err(|_| Error::Embedding("embedding model lock poisoned".to_string()))?;
        model
            .embed(texts.to_vec(), Some(self.batch_size))
            .map_err(|e| Error::Embedding(format!("Local embedding failed: {}", e)))
    }
}

#[cfg(feature = "local-embeddings-fastembed")]
fn config_to_fastembed_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
        "nomic-embed-text-v1" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV1),
        "nomic-embed-text-v1.5" => Ok(fastembed::EmbeddingModel::NomicEmbedTextV15),
        "multilingual-e5-small" => Ok(fastembed::EmbeddingModel::MultilingualE5Small),
        "multilingual-e5-base" => Ok(fastembed::EmbeddingModel::MultilingualE5Base),
        "multilingual-e5-large" => Ok(fastembed::EmbeddingModel::MultilingualE5Large),
        other => Err(Error::Config(format!(
            "Unknown local embedding model: '{}'",
            other
        ))),
    }
}

/// Create the configured [`Embedder`].
///
/// # Errors
///
/// Fails if the model name is unknown, the model cannot be loaded, or the
/// crate was built without a local embedding backend.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    #[cfg(feature = "local-embeddings-fastembed")]
    {
        Ok(Arc::new(LocalEmbedder::new(config)?))
    }
    #[cfg(not(feature = "local-embeddings-fastembed"))]
    {
        Err(Error::Config(format!(
            "Local embedding model '{}' requires --features local-embeddings-fastembed",
            config.model
        )))
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`:
/// - `1.0` = identical direction
/// - `0.0` = orthogonal (unrelated)
/// - `-1.0` = opposite direction
///
/// Returns `0.0` for empty vectors, vectors of different lengths, or a
/// zero-norm vector.
///
/// # Formula
///
/// ```text
///            a · b
/// cos(θ) = ─────────
///          ‖a‖ × ‖b‖
/// ```
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
