//! Context assembly: the boundary between retrieval and the language model.
//!
//! [`ContextBuilder`] runs a search and turns the ranked results into a
//! [`RetrievedContext`]: a formatted context block for the prompt plus a
//! sources list for display. It never calls the language model itself; the
//! consumer takes the assembled context downstream. When retrieval finds
//! nothing, the context block is an explicit no-context sentence and the
//! consumer proceeds anyway rather than failing the turn.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::document::SearchOutcome;
use crate::engine::{RetrievalEngine, SearchRequest};
use crate::error::Result;

/// Context block used when the request-scoped documents yield no results.
pub const NO_MEMORY_CONTEXT: &str = "No relevant content found in provided documents.";

/// Context block used when the owner's stored documents yield no results.
pub const NO_STORED_CONTEXT: &str = "No relevant documents found in the database.";

/// Stored-document text is previewed in the context block; request-scoped
/// text is included whole.
const PREVIEW_CHARS: usize = 500;

/// One retrieved source, shaped for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceEntry {
    /// The document id, or `memory_{index}` for request-scoped documents.
    pub reference: String,
    /// Display label; falls back to the reference when the source carries
    /// no filename.
    pub label: String,
    /// Relevance score of the underlying result.
    pub score: f32,
}

/// The assembled output of a retrieval turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// The formatted context block to hand to the language model. Never
    /// empty: when nothing was retrieved this is the explicit no-context
    /// sentence for the mode searched.
    pub context: String,
    /// One entry per retrieved result, in rank order.
    pub sources: Vec<SourceEntry>,
    /// True when the search ran in degraded (unranked) mode.
    pub degraded: bool,
    /// Number of candidates skipped because they could not be embedded.
    pub skipped: usize,
}

impl RetrievedContext {
    /// True when retrieval produced at least one source.
    pub fn has_sources(&self) -> bool {
        !self.sources.is_empty()
    }
}

/// Assembles LLM-ready context from search results.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::{ContextBuilder, SearchRequest};
///
/// let builder = ContextBuilder::new(engine);
/// let retrieved = builder
///     .assemble("Does the candidate know Python?", SearchRequest::InMemory { documents })
///     .await?;
/// println!("{}", retrieved.context);
/// ```
pub struct ContextBuilder {
    engine: RetrievalEngine,
}

impl ContextBuilder {
    /// Create a builder around a configured engine.
    pub fn new(engine: RetrievalEngine) -> Self {
        Self { engine }
    }

    /// Return a reference to the underlying engine.
    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    /// Search with the configured `top_k` budget and assemble the results.
    ///
    /// Request-scoped results are rendered with their full content
    /// (`[Document {n} - {filename}]:` sections separated by `---` rules);
    /// stored results are rendered as 500-character previews. Ranks drive
    /// the section numbering, so the most relevant document is always
    /// `[Document 1]`.
    ///
    /// # Errors
    ///
    /// Propagates engine errors ([`RagError::StoreError`](crate::error::RagError::StoreError),
    /// [`RagError::IsolationViolation`](crate::error::RagError::IsolationViolation)).
    /// A degraded search is not an error; the outcome's flag is carried
    /// through.
    pub async fn assemble(
        &self,
        question: &str,
        request: SearchRequest,
    ) -> Result<RetrievedContext> {
        let limit = self.engine.config().top_k;
        let in_memory = matches!(request, SearchRequest::InMemory { .. });

        let outcome = self.engine.search(question, request, limit).await?;

        if outcome.is_empty() {
            info!(degraded = outcome.degraded, "no context retrieved, signalling explicitly");
            let fallback = if in_memory { NO_MEMORY_CONTEXT } else { NO_STORED_CONTEXT };
            return Ok(RetrievedContext {
                context: fallback.to_string(),
                sources: Vec::new(),
                degraded: outcome.degraded,
                skipped: outcome.skipped,
            });
        }

        let context = if in_memory {
            Self::memory_context(&outcome)
        } else {
            Self::stored_context(&outcome)
        };
        let sources = outcome
            .results
            .iter()
            .map(|result| SourceEntry {
                reference: result.source.reference(),
                label: result.label.clone().unwrap_or_else(|| result.source.reference()),
                score: result.score,
            })
            .collect();

        Ok(RetrievedContext {
            context,
            sources,
            degraded: outcome.degraded,
            skipped: outcome.skipped,
        })
    }

    /// Request-scoped sections carry the full content; answers come straight
    /// from these texts, so nothing is cut.
    fn memory_context(outcome: &SearchOutcome) -> String {
        let parts: Vec<String> = outcome
            .results
            .iter()
            .map(|result| {
                let number = result.rank + 1;
                match &result.label {
                    Some(label) => format!("[Document {number} - {label}]:\n{}", result.text),
                    None => format!("[Document {number}]:\n{}", result.text),
                }
            })
            .collect();
        parts.join("\n\n---\n\n")
    }

    /// Stored documents can be arbitrarily long; sections carry a bounded
    /// preview instead of the whole text.
    fn stored_context(outcome: &SearchOutcome) -> String {
        let parts: Vec<String> = outcome
            .results
            .iter()
            .map(|result| {
                let number = result.rank + 1;
                format!("[Document {number}]: {}", preview(&result.text, PREVIEW_CHARS))
            })
            .collect();
        parts.join("\n\n")
    }
}

/// Truncate to `max_chars` characters (not bytes) with an ellipsis marker.
fn preview(text: &str, max_chars: usize) -> String {
    let mut indices = text.char_indices();
    match indices.nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &text[..byte_index]),
        None => text.to_string(),
    }
}
