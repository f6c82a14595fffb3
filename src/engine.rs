//! Dual-mode retrieval engine.
//!
//! [`RetrievalEngine`] ranks candidate documents against a query by
//! embedding both and sorting on cosine relevance. Candidates come from one
//! of two places, selected by the [`SearchRequest`] variant:
//!
//! - [`SearchRequest::Persistent`] — the owner's documents in the backing
//!   [`DocumentStore`], embedded at ingestion time
//! - [`SearchRequest::InMemory`] — documents supplied with the request,
//!   embedded on the fly and discarded afterwards
//!
//! A query that cannot be embedded degrades the search instead of failing
//! it: every candidate comes back unranked with a neutral score and
//! [`SearchOutcome::degraded`] set, so the consumer still has something to
//! hand the language model. A single candidate that cannot be embedded is
//! skipped and counted, never fatal.
//!
//! # Example
//!
//! ```rust,ignore
//! use docrag::{RetrievalEngine, SearchRequest, HashingEmbedder, InMemoryDocumentStore};
//!
//! let engine = RetrievalEngine::builder()
//!     .embedder(Arc::new(HashingEmbedder::new()))
//!     .store(Arc::new(InMemoryDocumentStore::new()))
//!     .build()?;
//!
//! let outcome = engine
//!     .search("Does the candidate know Python?", SearchRequest::InMemory { documents }, 3)
//!     .await?;
//! ```

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::RagConfig;
use crate::document::{Document, MemoryDocument, RetrievalResult, SearchOutcome, SourceRef};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::similarity::relevance;
use crate::store::DocumentStore;

/// A search request, selecting the retrieval mode by its shape.
///
/// The mode is an explicit variant rather than an implicit "which field is
/// set" convention: callers can only construct a well-formed request.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRequest {
    /// Search the owner's documents in the persistent store.
    Persistent {
        /// The owner whose documents may be searched. Hard isolation
        /// boundary: no other owner's documents ever appear in results.
        owner_id: String,
    },
    /// Search a request-scoped document set; nothing is persisted.
    InMemory {
        /// The documents to search, identified positionally in results.
        documents: Vec<MemoryDocument>,
    },
}

/// The retrieval engine.
///
/// Holds an injected embedding provider and document store; both are shared,
/// read-only collaborators, so one engine serves concurrent requests without
/// locking. Construct via [`RetrievalEngine::builder()`].
pub struct RetrievalEngine {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
}

impl RetrievalEngine {
    /// Create a new [`RetrievalEngineBuilder`].
    pub fn builder() -> RetrievalEngineBuilder {
        RetrievalEngineBuilder::default()
    }

    /// Return a reference to the engine configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Return a reference to the embedding provider.
    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Execute a search: embed the query, score the request's candidates,
    /// return the top `limit` results.
    ///
    /// Results are ordered by descending score with ranks assigned from 0;
    /// ties keep candidate order (stable sort). An empty candidate set
    /// yields an empty outcome, not an error. If the query itself cannot be
    /// embedded the outcome is degraded: all candidates, candidate order,
    /// neutral scores.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::StoreError`] if the persistent store cannot be
    /// read, and [`RagError::IsolationViolation`] if the fetched candidate
    /// set contains a document belonging to a different owner.
    pub async fn search(
        &self,
        query: &str,
        request: SearchRequest,
        limit: usize,
    ) -> Result<SearchOutcome> {
        match request {
            SearchRequest::Persistent { owner_id } => {
                self.persistent_search(query, &owner_id, limit).await
            }
            SearchRequest::InMemory { documents } => {
                self.in_memory_search(query, &documents, limit).await
            }
        }
    }

    /// Search the persistent store for the owner's most relevant documents.
    ///
    /// Convenience wrapper over [`search`](RetrievalEngine::search) with a
    /// [`SearchRequest::Persistent`] request.
    pub async fn search_persistent(
        &self,
        query: &str,
        owner_id: &str,
        limit: usize,
    ) -> Result<SearchOutcome> {
        self.search(query, SearchRequest::Persistent { owner_id: owner_id.to_string() }, limit)
            .await
    }

    /// Search a request-scoped document set.
    ///
    /// Convenience wrapper over [`search`](RetrievalEngine::search) with a
    /// [`SearchRequest::InMemory`] request.
    pub async fn search_in_memory(
        &self,
        query: &str,
        documents: Vec<MemoryDocument>,
        limit: usize,
    ) -> Result<SearchOutcome> {
        self.search(query, SearchRequest::InMemory { documents }, limit).await
    }

    async fn persistent_search(
        &self,
        query: &str,
        owner_id: &str,
        limit: usize,
    ) -> Result<SearchOutcome> {
        let query_embedding = match self.embedder.embed(query).await {
            Ok(embedding) => Some(embedding),
            Err(e) => {
                warn!(error = %e, "query embedding failed, degrading to unranked results");
                None
            }
        };

        let candidates = self.store.fetch_candidates(owner_id).await.map_err(|e| {
            error!(owner = owner_id, error = %e, "candidate fetch failed");
            e
        })?;

        self.verify_isolation(owner_id, &candidates)?;

        let Some(query_embedding) = query_embedding else {
            let results = Self::unranked(candidates, limit);
            info!(
                mode = "persistent",
                owner = owner_id,
                result_count = results.len(),
                "search completed (degraded)"
            );
            return Ok(SearchOutcome { results, degraded: true, skipped: 0 });
        };

        let candidate_count = candidates.len();
        let scored: Vec<RetrievalResult> = candidates
            .into_iter()
            .filter_map(|document| {
                // Documents without an embedding are never matched and never
                // an error; they simply are not candidates yet.
                let score = match document.embedding.as_deref() {
                    Some(embedding) => relevance(&query_embedding, embedding),
                    None => return None,
                };
                Some(RetrievalResult {
                    source: SourceRef::Stored { id: document.id },
                    label: document.filename,
                    text: document.content,
                    score,
                    rank: 0,
                })
            })
            .collect();

        let results = self.rank(scored, limit);
        info!(
            mode = "persistent",
            owner = owner_id,
            candidate_count,
            result_count = results.len(),
            "search completed"
        );
        Ok(SearchOutcome { results, degraded: false, skipped: 0 })
    }

    async fn in_memory_search(
        &self,
        query: &str,
        documents: &[MemoryDocument],
        limit: usize,
    ) -> Result<SearchOutcome> {
        if documents.is_empty() {
            info!(mode = "in_memory", candidate_count = 0, "search over empty document set");
            return Ok(SearchOutcome { results: Vec::new(), degraded: false, skipped: 0 });
        }

        let query_embedding = match self.embedder.embed(query).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(error = %e, "query embedding failed, degrading to unranked results");
                let results = documents
                    .iter()
                    .take(limit)
                    .enumerate()
                    .map(|(index, document)| RetrievalResult {
                        source: SourceRef::Memory { index },
                        label: Some(document.filename.clone()),
                        text: document.content.clone(),
                        score: 0.0,
                        rank: index,
                    })
                    .collect::<Vec<_>>();
                info!(
                    mode = "in_memory",
                    candidate_count = documents.len(),
                    result_count = results.len(),
                    "search completed (degraded)"
                );
                return Ok(SearchOutcome { results, degraded: true, skipped: 0 });
            }
        };

        let mut skipped = 0usize;
        let mut scored = Vec::with_capacity(documents.len());
        for (index, document) in documents.iter().enumerate() {
            let embedding = match self.embedder.embed(&document.content).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    warn!(
                        index,
                        filename = %document.filename,
                        error = %e,
                        "skipping document that could not be embedded"
                    );
                    skipped += 1;
                    continue;
                }
            };
            scored.push(RetrievalResult {
                source: SourceRef::Memory { index },
                label: Some(document.filename.clone()),
                text: document.content.clone(),
                score: relevance(&query_embedding, &embedding),
                rank: 0,
            });
        }

        let results = self.rank(scored, limit);
        info!(
            mode = "in_memory",
            candidate_count = documents.len(),
            result_count = results.len(),
            skipped,
            "search completed"
        );
        Ok(SearchOutcome { results, degraded: false, skipped })
    }

    /// Refuse to rank a candidate set containing another owner's document.
    /// This is a security boundary, not a scoring concern.
    fn verify_isolation(&self, owner_id: &str, candidates: &[Document]) -> Result<()> {
        for candidate in candidates {
            if candidate.owner_id != owner_id {
                error!(
                    document = %candidate.id,
                    requested = owner_id,
                    actual = %candidate.owner_id,
                    "owner isolation violation in fetched candidates"
                );
                return Err(RagError::IsolationViolation {
                    document_id: candidate.id.clone(),
                    requested_owner: owner_id.to_string(),
                    actual_owner: candidate.owner_id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Sort scored results descending (stable, so ties keep candidate
    /// order), apply the optional score threshold, truncate to `limit`,
    /// and assign ranks.
    fn rank(&self, mut scored: Vec<RetrievalResult>, limit: usize) -> Vec<RetrievalResult> {
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(threshold) = self.config.similarity_threshold {
            scored.retain(|result| result.score >= threshold);
        }
        scored.truncate(limit);
        for (rank, result) in scored.iter_mut().enumerate() {
            result.rank = rank;
        }
        scored
    }

    fn unranked(candidates: Vec<Document>, limit: usize) -> Vec<RetrievalResult> {
        candidates
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, document)| RetrievalResult {
                source: SourceRef::Stored { id: document.id },
                label: document.filename,
                text: document.content,
                score: 0.0,
                rank: index,
            })
            .collect()
    }
}

/// Builder for constructing a [`RetrievalEngine`].
///
/// The embedding provider and document store are required; the configuration
/// defaults to [`RagConfig::default()`].
///
/// # Example
///
/// ```rust,ignore
/// let engine = RetrievalEngine::builder()
///     .config(RagConfig::builder().top_k(5).build()?)
///     .embedder(Arc::new(HashingEmbedder::new()))
///     .store(Arc::new(InMemoryDocumentStore::new()))
///     .build()?;
/// ```
#[derive(Default)]
pub struct RetrievalEngineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn DocumentStore>>,
}

impl RetrievalEngineBuilder {
    /// Set the engine configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

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

    /// Build the [`RetrievalEngine`], validating that required parts are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the embedder or store is missing.
    pub fn build(self) -> Result<RetrievalEngine> {
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let store =
            self.store.ok_or_else(|| RagError::ConfigError("store is required".to_string()))?;

        Ok(RetrievalEngine { config: self.config.unwrap_or_default(), embedder, store })
    }
}
