//! Distance and similarity computation for embeddings.

use ordered_float::OrderedFloat;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Compute the L2 (euclidean) distance between two embeddings.
pub fn l2_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let sum: f32 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();

    Ok(sum.sqrt())
}

/// Convert an L2 distance to a similarity score in [0, 1].
///
/// For unit-length embeddings the L2 distance is bounded in [0, 2], so
/// `1 - d/2` maps it onto [0, 1] with higher meaning more relevant. The
/// result is clamped so a non-normalized input can never produce a score
/// outside the range.
pub fn distance_to_similarity(distance: f32) -> f32 {
    (1.0 - distance / 2.0).clamp(0.0, 1.0)
}

/// Normalize an embedding to unit length.
///
/// A zero vector is left unchanged.
pub fn normalize(embedding: &mut Embedding) {
    let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in embedding.iter_mut() {
            *x /= magnitude;
        }
    }
}

/// Find the `k` nearest candidates to `query` by L2 distance.
///
/// Returns `(distance, candidate_position)` pairs ordered ascending by
/// distance; ties keep the candidates' original order.
pub fn find_nearest(
    query: &Embedding,
    candidates: &[Embedding],
    k: usize,
) -> Result<Vec<(f32, usize)>> {
    let mut scored: Vec<(OrderedFloat<f32>, usize)> = Vec::with_capacity(candidates.len());

    for (position, embedding) in candidates.iter().enumerate() {
        let distance = l2_distance(query, embedding)?;
        scored.push((OrderedFloat(distance), position));
    }

    // Stable sort keeps insertion order among equal distances.
    scored.sort_by_key(|(distance, _)| *distance);

    Ok(scored
        .into_iter()
        .take(k)
        .map(|(distance, position)| (distance.0, position))
        .collect())
}
