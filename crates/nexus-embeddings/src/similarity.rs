//! Vector math for image similarity.

use crate::error::EmbeddingError;

/// Scale `vector` to unit length. Zero vectors are returned unchanged.
#[must_use]
pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

/// Cosine similarity of two vectors; 0 when either has zero length.
///
/// # Errors
///
/// [`EmbeddingError::DimensionMismatch`] when the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a * norm_b))
}

/// A candidate and its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<K> {
    pub key: K,
    pub score: f32,
}

/// The `k` candidates most similar to `query`, best first.
///
/// Candidates whose dimension differs from the query are skipped. Ties keep
/// input order.
pub fn rank_top_k<K, I>(query: &[f32], candidates: I, k: usize) -> Vec<Ranked<K>>
where
    I: IntoIterator<Item = (K, Vec<f32>)>,
{
    let mut ranked: Vec<Ranked<K>> = candidates
        .into_iter()
        .filter_map(|(key, vector)| match cosine_similarity(query, &vector) {
            Ok(score) => Some(Ranked { key, score }),
            Err(error) => {
                tracing::warn!(%error, "skipping candidate");
                None
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(k);
    ranked
}
