//! In-memory document store.
//!
//! This module provides [`InMemoryDocumentStore`], a zero-dependency store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is suitable
//! for development, testing, and small single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::Document;
use crate::error::Result;
use crate::store::DocumentStore;

/// An in-memory [`DocumentStore`] partitioned by owner.
///
/// Each owner's documents are kept in insertion order, so candidate fetches
/// (and therefore degraded-mode results) are deterministic across calls.
/// All operations are async-safe via `tokio::sync::RwLock`.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::{DocumentStore, InMemoryDocumentStore};
///
/// let store = InMemoryDocumentStore::new();
/// store.upsert(&documents).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    owners: RwLock<HashMap<String, Vec<Document>>>,
}

impl InMemoryDocumentStore {
    /// Create a new empty in-memory document store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored for the given owner.
    pub async fn count(&self, owner_id: &str) -> usize {
        let owners = self.owners.read().await;
        owners.get(owner_id).map_or(0, Vec::len)
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn upsert(&self, documents: &[Document]) -> Result<()> {
        let mut owners = self.owners.write().await;
        for document in documents {
            let entries = owners.entry(document.owner_id.clone()).or_default();
            match entries.iter_mut().find(|d| d.id == document.id) {
                Some(existing) => *existing = document.clone(),
                None => entries.push(document.clone()),
            }
        }
        Ok(())
    }

    async fn fetch_candidates(&self, owner_id: &str) -> Result<Vec<Document>> {
        let owners = self.owners.read().await;
        Ok(owners.get(owner_id).cloned().unwrap_or_default())
    }
}
