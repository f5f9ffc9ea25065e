//! End-to-end tests for the retrieval cascade against a persisted
//! snapshot, using the deterministic hash encoder.

use std::sync::Arc;

use prepmate_embeddings::{EmbeddingEncoder, HashEncoder, IndexSnapshot};
use prepmate_retrieval::{Provenance, RetrievalCascade};
use tempfile::TempDir;

const DIMENSION: usize = 64;

async fn build_snapshot(documents: &[&str]) -> IndexSnapshot {
    let encoder = HashEncoder::with_dimension(DIMENSION);
    let texts: Vec<String> = documents.iter().map(|d| d.to_string()).collect();
    let embeddings = encoder.embed_batch(&texts).await.unwrap();
    IndexSnapshot::from_parts(texts, embeddings, DIMENSION).unwrap()
}

#[tokio::test]
async fn retrieves_exact_document_from_persisted_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let snapshot = build_snapshot(&[
        "a hash map stores key value pairs with constant time lookup",
        "a binary heap keeps the largest element at the root",
        "quicksort partitions around a pivot element",
    ])
    .await;

    snapshot.save(temp_dir.path()).await.unwrap();
    let loaded = RetrievalCascade::load_snapshot(temp_dir.path())
        .await
        .expect("snapshot should load");

    let cascade = RetrievalCascade::builder()
        .with_snapshot(loaded)
        .with_encoder(Arc::new(HashEncoder::with_dimension(DIMENSION)))
        .build();

    // The exact document text embeds to the exact same vector, so it is
    // accepted at any threshold and comes back first.
    let items = cascade
        .retrieve(
            "a hash map stores key value pairs with constant time lookup",
            2,
            0.9,
        )
        .await
        .unwrap();

    assert!(!items.is_empty());
    assert_eq!(
        items[0].text(),
        "a hash map stores key value pairs with constant time lookup"
    );
    assert_eq!(items[0].provenance(), Provenance::Index);
}

#[tokio::test]
async fn missing_snapshot_directory_degrades_to_none() {
    let temp_dir = TempDir::new().unwrap();
    let loaded = RetrievalCascade::load_snapshot(temp_dir.path().join("absent")).await;
    assert!(loaded.is_none());

    // A cascade without any source still answers, with nothing.
    let cascade = RetrievalCascade::builder().build();
    let items = cascade.retrieve("anything", 4, 0.5).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn strict_threshold_rejects_unrelated_documents() {
    let snapshot = build_snapshot(&[
        "tcp is a connection oriented transport protocol",
        "udp is a connectionless transport protocol",
    ])
    .await;

    let cascade = RetrievalCascade::builder()
        .with_snapshot(Arc::new(snapshot))
        .with_encoder(Arc::new(HashEncoder::with_dimension(DIMENSION)))
        .build();

    let items = cascade
        .retrieve("completely different topic entirely", 2, 0.99)
        .await
        .unwrap();
    assert!(items.is_empty());
}
