//! Deterministic hashed bag-of-words embedding provider.
//!
//! [`HashingEmbedder`] maps each token to a fixed bucket of the output
//! vector, weights buckets by term frequency, and L2-normalizes the result.
//! It runs fully offline with no model weights, which makes it the default
//! provider for development, tests, and environments without an embedding
//! service. Vectors capture lexical overlap only, not meaning.

use async_trait::async_trait;

use crate::embedding::EmbeddingProvider;
use crate::error::Result;

/// Default embedding dimensionality.
pub const DEFAULT_DIMENSIONS: usize = 384;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over the token bytes. Fixed constants keep bucket assignment
/// identical across platforms and compiler releases; stored embeddings must
/// re-verify against fresh computation indefinitely.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// A deterministic, offline embedding provider.
///
/// Text is lowercased and split on whitespace and ASCII punctuation; each
/// token is hashed into one of `dimensions` buckets; bucket counts are
/// L2-normalized. Identical text always produces an identical vector, and
/// the empty string produces the zero vector.
///
/// # Example
///
/// ```rust,ignore
/// use docrag::{EmbeddingProvider, HashingEmbedder};
///
/// let provider = HashingEmbedder::new();
/// let a = provider.embed("Python experience").await?;
/// let b = provider.embed("python experience!").await?;
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Create a provider with the default dimensionality
    /// ([`DEFAULT_DIMENSIONS`]).
    pub fn new() -> Self {
        Self { dimensions: DEFAULT_DIMENSIONS }
    }

    /// Create a provider with a custom dimensionality (minimum 1).
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let tokens = text
            .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
            .filter(|t| !t.is_empty());

        for token in tokens {
            let token = token.to_lowercase();
            let bucket = (fnv1a(token.as_bytes()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }

        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_sync(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
