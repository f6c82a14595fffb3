//! Word-window document chunking.
//!
//! Long documents are split into overlapping windows of words so each piece
//! stays within the embedding model's effective input length and so a narrow
//! query can match a narrow span instead of a diluted whole document. The
//! overlap keeps information at window boundaries retrievable.

use crate::config::RagConfig;
use crate::document::TextChunk;

/// Split text into overlapping word windows.
///
/// The text is tokenized on whitespace and a window of `chunk_size` words is
/// slid forward by `chunk_size - overlap` words per step. The final window
/// may be shorter than `chunk_size` (no padding). Text with at most
/// `chunk_size` words produces exactly one chunk equal to the whole input.
///
/// An `overlap >= chunk_size` is clamped to `chunk_size - 1` instead of
/// erroring, so a bad parameter cannot stall the pipeline. Empty or
/// whitespace-only text produces no chunks.
///
/// Each [`TextChunk`] carries the word index its window starts at. Chunks
/// are produced in document order; ordering carries no retrieval meaning
/// (each chunk is embedded and searched independently) but allows
/// reassembling context in source order.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::chunk_text;
///
/// let chunks = chunk_text(&long_text, 500, 50);
/// assert!(chunks.windows(2).all(|w| w[1].offset - w[0].offset == 450));
/// ```
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let chunk_size = chunk_size.max(1);
    let overlap = overlap.min(chunk_size - 1);

    // Short documents are passed through whole, untouched.
    if words.len() <= chunk_size {
        return vec![TextChunk { text: text.to_string(), offset: 0 }];
    }

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < words.len() {
        let end = (start + chunk_size).min(words.len());
        chunks.push(TextChunk { text: words[start..end].join(" "), offset: start });
        start += step;
    }

    chunks
}

/// A configured word-window chunker.
///
/// Thin wrapper around [`chunk_text`] holding the window parameters, used by
/// the ingestion pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::WordChunker;
///
/// let chunker = WordChunker::new(500, 50);
/// let chunks = chunker.chunk(&document_text);
/// ```
#[derive(Debug, Clone)]
pub struct WordChunker {
    chunk_size: usize,
    overlap: usize,
}

impl WordChunker {
    /// Create a new `WordChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of words per chunk
    /// * `overlap` — number of overlapping words between consecutive chunks
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self { chunk_size, overlap }
    }

    /// Create a `WordChunker` from the chunking parameters of a [`RagConfig`].
    pub fn from_config(config: &RagConfig) -> Self {
        Self { chunk_size: config.chunk_size, overlap: config.chunk_overlap }
    }

    /// Split `text` into overlapping word windows. See [`chunk_text`].
    pub fn chunk(&self, text: &str) -> Vec<TextChunk> {
        chunk_text(text, self.chunk_size, self.overlap)
    }
}

impl Default for WordChunker {
    fn default() -> Self {
        Self::from_config(&RagConfig::default())
    }
}
