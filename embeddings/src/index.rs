//! Flat vector index for nearest-neighbor lookups.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::similarity::find_nearest;

/// A flat nearest-neighbor index over fixed-dimension embeddings.
///
/// Embeddings are stored in insertion order; a stored embedding's position
/// is its identity. The index is append-only at build time and read-only
/// once the live service loads it, so concurrent searches need no locking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    /// Stored embeddings, in insertion order.
    embeddings: Vec<Embedding>,

    /// Expected dimension of every embedding.
    dimension: usize,
}

impl VectorIndex {
    /// Create a new empty index for embeddings of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            embeddings: Vec::new(),
            dimension,
        }
    }

    /// Append an embedding to the index.
    ///
    /// Build-time only; the position of the new embedding is returned.
    pub fn add(&mut self, embedding: Embedding) -> Result<usize> {
        if embedding.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: embedding.len(),
            });
        }

        self.embeddings.push(embedding);
        let position = self.embeddings.len() - 1;
        debug!("Added embedding to index at position {position}");

        Ok(position)
    }

    /// The dimension this index expects.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of stored embeddings.
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Search for the `k` nearest stored embeddings.
    ///
    /// Returns parallel vectors of distances and positions, ordered
    /// ascending by distance. When `k` exceeds the number of stored
    /// embeddings, fewer results are returned. Ties in distance keep the
    /// stored embeddings' insertion order.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<(Vec<f32>, Vec<usize>)> {
        if query.len() != self.dimension {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let nearest = find_nearest(query, &self.embeddings, k)?;

        let mut distances = Vec::with_capacity(nearest.len());
        let mut positions = Vec::with_capacity(nearest.len());
        for (distance, position) in nearest {
            distances.push(distance);
            positions.push(position);
        }

        Ok((distances, positions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_add_and_len() {
        let mut index = VectorIndex::new(3);
        index.add(vec![1.0, 0.0, 0.0]).unwrap();
        index.add(vec![0.0, 1.0, 0.0]).unwrap();

        assert_eq!(index.len(), 2);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_index_search_orders_by_distance() {
        let mut index = VectorIndex::new(2);
        index.add(vec![5.0, 0.0]).unwrap();
        index.add(vec![1.0, 0.0]).unwrap();
        index.add(vec![3.0, 0.0]).unwrap();

        let (distances, positions) = index.search(&vec![0.0, 0.0], 2).unwrap();

        assert_eq!(positions, vec![1, 2]);
        assert!((distances[0] - 1.0).abs() < 1e-6);
        assert!((distances[1] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_index_search_k_exceeds_len() {
        let mut index = VectorIndex::new(2);
        index.add(vec![1.0, 0.0]).unwrap();

        let (distances, positions) = index.search(&vec![0.0, 0.0], 10).unwrap();
        assert_eq!(distances.len(), 1);
        assert_eq!(positions.len(), 1);
    }

    #[test]
    fn test_index_search_empty() {
        let index = VectorIndex::new(2);
        let (distances, positions) = index.search(&vec![0.0, 0.0], 3).unwrap();
        assert!(distances.is_empty());
        assert!(positions.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_on_add() {
        let mut index = VectorIndex::new(3);
        assert!(index.add(vec![1.0, 0.0]).is_err());
    }

    #[test]
    fn test_dimension_mismatch_on_search() {
        let index = VectorIndex::new(3);
        assert!(index.search(&vec![1.0, 0.0], 1).is_err());
    }
}
