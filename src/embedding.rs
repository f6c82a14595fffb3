//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends behind a unified async
/// interface. Providers must be deterministic: the same text yields the same
/// vector for the lifetime of the provider, since stored embeddings are never
/// recomputed on read. Empty input must produce a well-defined vector
/// (typically the zero vector), not an error, so batch pipelines survive
/// blank documents.
///
/// Providers are shared across concurrent requests as
/// `Arc<dyn EmbeddingProvider>`; inference takes `&self` and needs no locking.
///
/// The default [`embed_batch`](EmbeddingProvider::embed_batch) implementation
/// calls [`embed`](EmbeddingProvider::embed) sequentially; backends with
/// native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::EmbeddingProvider;
///
/// let provider = HashingEmbedder::new();
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ModelUnavailable`](crate::error::RagError::ModelUnavailable)
    /// when the backend cannot be reached at all, and
    /// [`RagError::EmbeddingError`](crate::error::RagError::EmbeddingError)
    /// when this particular input could not be embedded. The retrieval
    /// engine degrades or skips accordingly.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input and fails on the first error.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
