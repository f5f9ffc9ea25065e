//! Persisted index snapshots.
//!
//! A snapshot pairs an ordered list of document texts with a [`VectorIndex`]
//! over their embeddings. The Nth document's embedding sits at position N in
//! the index; the two artifacts are loaded and saved together and validated
//! against each other so they can never diverge.

use std::path::Path;

use tokio::fs;
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};
use crate::index::VectorIndex;

/// File name of the serialized vector index artifact.
pub const VECTORS_FILE: &str = "vectors.json";

/// File name of the parallel document list artifact.
pub const DOCUMENTS_FILE: &str = "documents.json";

/// Maximum length of one stored document, in characters.
pub const MAX_DOCUMENT_CHARS: usize = 1000;

/// An immutable snapshot of indexed documents and their embeddings.
///
/// Built offline by the index builder, loaded read-only by the live
/// service, and replaced only by a full rebuild. Concurrent reads are safe.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    documents: Vec<String>,
    index: VectorIndex,
}

impl IndexSnapshot {
    /// Assemble a snapshot from parallel documents and embeddings.
    ///
    /// The two sequences must have equal length and the embeddings must all
    /// match the given dimension.
    pub fn from_parts(
        documents: Vec<String>,
        embeddings: Vec<Embedding>,
        dimension: usize,
    ) -> Result<Self> {
        if documents.len() != embeddings.len() {
            return Err(EmbeddingError::SnapshotCorrupt(format!(
                "{} documents but {} embeddings",
                documents.len(),
                embeddings.len()
            )));
        }

        let mut index = VectorIndex::new(dimension);
        for embedding in embeddings {
            index.add(embedding)?;
        }

        Ok(Self { documents, index })
    }

    /// Load a snapshot from a directory containing both artifacts.
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let vectors_json = fs::read_to_string(dir.join(VECTORS_FILE)).await?;
        let documents_json = fs::read_to_string(dir.join(DOCUMENTS_FILE)).await?;

        let index: VectorIndex = serde_json::from_str(&vectors_json)?;
        let documents: Vec<String> = serde_json::from_str(&documents_json)?;

        if documents.len() != index.len() {
            return Err(EmbeddingError::SnapshotCorrupt(format!(
                "{} documents but {} embeddings in {}",
                documents.len(),
                index.len(),
                dir.display()
            )));
        }

        info!("Loaded index snapshot with {} documents", documents.len());
        Ok(Self { documents, index })
    }

    /// Save the snapshot into a directory.
    ///
    /// Each artifact is written to a temp file and renamed into place, the
    /// vector index first, so a concurrent loader never observes a
    /// half-written file.
    pub async fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        let vectors_json = serde_json::to_string(&self.index)?;
        let documents_json = serde_json::to_string(&self.documents)?;

        write_atomic(&dir.join(VECTORS_FILE), &vectors_json).await?;
        write_atomic(&dir.join(DOCUMENTS_FILE), &documents_json).await?;

        info!(
            "Saved index snapshot with {} documents to {}",
            self.documents.len(),
            dir.display()
        );
        Ok(())
    }

    /// Search the snapshot for the `k` nearest documents.
    ///
    /// Returns parallel distances and document positions, ascending by
    /// distance.
    pub fn search(&self, query: &Embedding, k: usize) -> Result<(Vec<f32>, Vec<usize>)> {
        self.index.search(query, k)
    }

    /// Get a document by its position.
    pub fn document(&self, position: usize) -> Option<&str> {
        self.documents.get(position).map(String::as_str)
    }

    /// All document texts, in index order.
    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// The embedding dimension of the snapshot.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if the snapshot holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Write `content` to `path` via a temp file in the same directory.
async fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;
    debug!("Wrote {}", path.display());
    Ok(())
}
