//! Error types for the `docrag` crate.

use thiserror::Error;

/// Errors that can occur in retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// The embedding backend failed to initialize or is unreachable.
    ///
    /// The retrieval engine treats this as a degraded-mode signal when it
    /// occurs on the query itself: candidates are returned unranked instead
    /// of failing the search (see [`SearchOutcome::degraded`](crate::document::SearchOutcome)).
    #[error("Embedding model unavailable ({provider}): {message}")]
    ModelUnavailable {
        /// The embedding provider that is unavailable.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A single piece of text could not be embedded.
    ///
    /// Recovered locally during candidate scoring: the item is skipped and
    /// counted, and the rest of the batch proceeds.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the document store backend.
    #[error("Document store error ({backend}): {message}")]
    StoreError {
        /// The store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A fetched candidate does not belong to the requesting owner.
    ///
    /// This is a breach of the owner-isolation security boundary, not a
    /// recoverable condition. The engine refuses to produce results from a
    /// candidate set it cannot trust.
    #[error(
        "Owner isolation violation: document '{document_id}' belongs to \
         '{actual_owner}', not '{requested_owner}'"
    )]
    IsolationViolation {
        /// The document that leaked across the owner boundary.
        document_id: String,
        /// The owner the search was scoped to.
        requested_owner: String,
        /// The owner the document actually belongs to.
        actual_owner: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// A convenience result type for retrieval operations.
pub type Result<T> = std::result::Result<T, RagError>;
