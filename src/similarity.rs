//! Cosine-based relevance scoring between embedding vectors.

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude or the lengths differ,
/// rather than dividing by zero: an empty-string embedding still gets a
/// defined (minimal) score against everything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Compute cosine distance between two vectors (`1 - cosine_similarity`).
///
/// 0.0 means identical direction; degenerate inputs (zero norm, mismatched
/// lengths) yield the maximal distance 1.0.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    1.0 - cosine_similarity(a, b)
}

/// Relevance score between a query vector and a candidate vector.
///
/// Defined as `1 - cosine_distance`, so higher is better. The range is
/// [-1, 1] in general, realistically [0, 1] for term-frequency embeddings.
/// Symmetric in its arguments.
pub fn relevance(query: &[f32], candidate: &[f32]) -> f32 {
    1.0 - cosine_distance(query, candidate)
}
