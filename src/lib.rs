//! # docrag
//!
//! Embedding-based semantic retrieval core for document-matching and chat
//! applications: word-window chunking, pluggable embedding providers, and a
//! dual-mode search engine that ranks either persistent owner-scoped
//! documents or request-scoped in-memory documents by cosine relevance.
//!
//! The crate ends where the language model begins: it produces ranked
//! results and an assembled context block, and hands both to the consumer.
//!
//! ## Features
//!
//! - **Dual-mode search**: one [`SearchRequest`] enum covers persistent
//!   (store-backed, owner-isolated) and in-memory (per-request, positional)
//!   retrieval
//! - **Degraded, never broken**: an unavailable embedding model yields
//!   unranked results with a flag instead of a failed request
//! - **Word-window chunking**: overlapping windows keep boundary
//!   information retrievable
//! - **Pluggable backends**: in-memory store and offline hashed embeddings
//!   by default; `pgvector` (sqlx/PostgreSQL) and `ollama` (reqwest)
//!   behind feature flags
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docrag::{
//!     ContextBuilder, HashingEmbedder, InMemoryDocumentStore, MemoryDocument,
//!     RetrievalEngine, SearchRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> docrag::Result<()> {
//!     let engine = RetrievalEngine::builder()
//!         .embedder(Arc::new(HashingEmbedder::new()))
//!         .store(Arc::new(InMemoryDocumentStore::new()))
//!         .build()?;
//!
//!     let documents = vec![MemoryDocument {
//!         filename: "cv.pdf".into(),
//!         content: "5 years Python experience at IBM".into(),
//!         kind: "applicant".into(),
//!     }];
//!
//!     let retrieved = ContextBuilder::new(engine)
//!         .assemble("Does the candidate know Python?", SearchRequest::InMemory { documents })
//!         .await?;
//!
//!     println!("{}", retrieved.context);
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod config;
pub mod context;
pub mod document;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod hashing;
pub mod ingest;
pub mod inmemory;
pub mod similarity;
pub mod store;

#[cfg(feature = "ollama")]
pub mod ollama;
#[cfg(feature = "pgvector")]
pub mod pgvector;

pub use chunking::{WordChunker, chunk_text};
pub use config::{RagConfig, RagConfigBuilder};
pub use context::{
    ContextBuilder, NO_MEMORY_CONTEXT, NO_STORED_CONTEXT, RetrievedContext, SourceEntry,
};
pub use document::{
    Document, MemoryDocument, RetrievalResult, SearchOutcome, SourceRef, TextChunk,
};
pub use embedding::EmbeddingProvider;
pub use engine::{RetrievalEngine, RetrievalEngineBuilder, SearchRequest};
pub use error::{RagError, Result};
pub use hashing::HashingEmbedder;
pub use ingest::{IngestPipeline, IngestPipelineBuilder};
pub use inmemory::InMemoryDocumentStore;
pub use similarity::{cosine_distance, cosine_similarity, relevance};
pub use store::DocumentStore;
