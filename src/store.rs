//! Document store trait: the retrieval engine's view of persistence.

use async_trait::async_trait;

use crate::document::Document;
use crate::error::Result;

/// A storage backend holding owner-partitioned documents with optional
/// embeddings.
///
/// The retrieval engine only ever asks for one owner's candidate set and
/// scores it itself; it knows nothing about tables, SQL, or indexes. The
/// write side exists for the ingestion pipeline, which attaches embeddings
/// and stores chunk sub-documents. Document deletion cascades from the
/// owning application records and is not this contract's concern.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::{DocumentStore, InMemoryDocumentStore};
///
/// let store = InMemoryDocumentStore::new();
/// store.upsert(&documents).await?;
/// let candidates = store.fetch_candidates("user_42").await?;
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert documents, replacing any existing document with the same id.
    async fn upsert(&self, documents: &[Document]) -> Result<()>;

    /// Fetch all of one owner's documents, embedded or not.
    ///
    /// Returns them in a stable backend-defined order. Documents without an
    /// embedding are included; the engine decides what to do with them
    /// (excluded from ranking, returned in degraded mode). Must never
    /// return another owner's documents.
    async fn fetch_candidates(&self, owner_id: &str) -> Result<Vec<Document>>;
}
