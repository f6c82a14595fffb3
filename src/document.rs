//! Data types for documents, chunks, and search results.

use serde::{Deserialize, Serialize};

/// A persistent document record owned by a single user.
///
/// This is the minimal shape the retrieval engine needs from the storage
/// layer; everything else about a document (upload metadata, parsing state)
/// lives with the external ingestion process.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Opaque unique identifier, stable across requests.
    pub id: String,
    /// Identifier of the owning user. Searches are isolated per owner.
    pub owner_id: String,
    /// Optional display label (typically the uploaded file name).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Full plain-text content.
    pub content: String,
    /// Embedding vector for `content`, absent until computed.
    ///
    /// When present, it is exactly the provider's embedding of `content` at
    /// the time of the last write; nothing re-embeds on read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// A transient, request-scoped document with no persistent identity.
///
/// Supplied inline with a search request, embedded on the fly, and discarded
/// once the response is produced. Identity is positional: the document's
/// index in the request list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryDocument {
    /// Display label for source attribution.
    pub filename: String,
    /// Full plain-text content.
    pub content: String,
    /// Free-form tag (e.g. "employer", "applicant") used only for downstream
    /// labeling, never for retrieval logic.
    #[serde(rename = "type")]
    pub kind: String,
}

/// A window of words produced by the chunker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextChunk {
    /// The chunk text.
    pub text: String,
    /// Word-index start position within the source text.
    pub offset: usize,
}

/// The origin of a retrieval result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum SourceRef {
    /// A persistent document, referenced by its stable id.
    Stored {
        /// The document id.
        id: String,
    },
    /// A request-scoped document, referenced by its position in the input
    /// list.
    Memory {
        /// Zero-based index within the request's document list.
        index: usize,
    },
}

impl SourceRef {
    /// Render the reference string used for source attribution:
    /// the document id, or `memory_{index}` for request-scoped documents.
    pub fn reference(&self) -> String {
        match self {
            SourceRef::Stored { id } => id.clone(),
            SourceRef::Memory { index } => format!("memory_{index}"),
        }
    }
}

/// A single ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Where the hit came from.
    pub source: SourceRef,
    /// Display label, when the source carries one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// The retrieved text.
    pub text: String,
    /// Relevance score (`1 - cosine_distance`); higher is better.
    pub score: f32,
    /// Position in the sorted result list (0 = most relevant).
    pub rank: usize,
}

/// The outcome of a search, including its failure-recovery surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Ranked results, best first.
    pub results: Vec<RetrievalResult>,
    /// True when the query could not be embedded and the candidates were
    /// returned unranked with neutral scores instead.
    pub degraded: bool,
    /// Number of candidates skipped because their text could not be embedded.
    pub skipped: usize,
}

impl SearchOutcome {
    /// True when the search produced no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
