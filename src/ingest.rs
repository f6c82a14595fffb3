//! Document ingestion: embed content and write it to the store.
//!
//! Retrieval never writes; this pipeline is the separate path that prepares
//! persistent documents for Mode-A search, either by attaching one embedding
//! to a whole document or by splitting it into word-window chunks stored as
//! sub-documents.
//!
//! # Example
//!
//! ```rust,ignore
//! use docrag::{IngestPipeline, WordChunker};
//!
//! let pipeline = IngestPipeline::builder()
//!     .embedder(Arc::new(HashingEmbedder::new()))
//!     .store(Arc::new(InMemoryDocumentStore::new()))
//!     .chunker(WordChunker::new(500, 50))
//!     .build()?;
//!
//! pipeline.embed_document(&mut document).await?;
//! let stored_chunks = pipeline.ingest_chunked(&long_document).await?;
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::WordChunker;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::store::DocumentStore;

/// The ingestion pipeline: chunk (optionally) → embed → store.
///
/// Unlike searches, ingestion fails hard on embedding errors: a stored
/// embedding must always equal a fresh embedding of the stored content, so
/// nothing gets written when the provider cannot deliver.
pub struct IngestPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    chunker: WordChunker,
}

impl IngestPipeline {
    /// Create a new [`IngestPipelineBuilder`].
    pub fn builder() -> IngestPipelineBuilder {
        IngestPipelineBuilder::default()
    }

    /// Embed a document's full content, attach the vector, and upsert it.
    ///
    /// The document is stored as a single retrieval unit; use
    /// [`ingest_chunked`](IngestPipeline::ingest_chunked) for long content.
    ///
    /// # Errors
    ///
    /// Propagates embedding and store errors; on error the document is left
    /// unmodified in the store.
    pub async fn embed_document(&self, document: &mut Document) -> Result<()> {
        let embedding = self.embedder.embed(&document.content).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
            e
        })?;
        document.embedding = Some(embedding);

        self.store.upsert(std::slice::from_ref(document)).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during ingestion");
            e
        })?;

        info!(document.id = %document.id, "embedded and stored document");
        Ok(())
    }

    /// Chunk a document's content, embed each chunk, and store the chunks as
    /// sub-documents `{parent_id}_chunk_{index}` under the same owner.
    ///
    /// Returns the stored sub-documents (with embeddings attached). The
    /// parent document itself is not written. Empty content stores nothing.
    ///
    /// # Errors
    ///
    /// Propagates embedding and store errors on the first failure; no
    /// partial chunk set is reported as success.
    pub async fn ingest_chunked(&self, document: &Document) -> Result<Vec<Document>> {
        let chunks = self.chunker.chunk(&document.content);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
            e
        })?;

        let sub_documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (chunk, embedding))| Document {
                id: format!("{}_chunk_{index}", document.id),
                owner_id: document.owner_id.clone(),
                filename: document.filename.clone(),
                content: chunk.text,
                embedding: Some(embedding),
            })
            .collect();

        self.store.upsert(&sub_documents).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during ingestion");
            e
        })?;

        let chunk_count = sub_documents.len();
        info!(document.id = %document.id, chunk_count, "ingested document");
        Ok(sub_documents)
    }
}

/// Builder for constructing an [`IngestPipeline`].
///
/// The embedder and store are required; the chunker defaults to the
/// configured word-window defaults.
#[derive(Default)]
pub struct IngestPipelineBuilder {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn DocumentStore>>,
    chunker: Option<WordChunker>,
}

impl IngestPipelineBuilder {
    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the document store backend.
    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the word-window chunker.
    pub fn chunker(mut self, chunker: WordChunker) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`IngestPipeline`], validating that required parts are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the embedder or store is missing.
    pub fn build(self) -> Result<IngestPipeline> {
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| RagError::ConfigError("store is required".to_string()))?;

        Ok(IngestPipeline { embedder, store, chunker: self.chunker.unwrap_or_default() })
    }
}
