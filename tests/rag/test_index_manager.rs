// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Index lifecycle tests: persistence, append, clear, self-healing

use std::path::Path;
use std::sync::Arc;

use docqa_node::rag::chunker::{ChunkMetadata, DocumentChunk};
use docqa_node::vector::{HashEmbedder, IndexManager};

fn chunk(content: &str, index: usize, total: usize) -> DocumentChunk {
    DocumentChunk {
        content: content.to_string(),
        metadata: ChunkMetadata {
            document_name: "doc".to_string(),
            page_number: 1,
            total_pages: 1,
            chunk_index: index,
            total_chunks: total,
        },
    }
}

fn manager(dir: &Path) -> IndexManager {
    IndexManager::new(dir.join("store"), Arc::new(HashEmbedder::default()))
}

#[tokio::test]
async fn test_index_persists_across_manager_instances() {
    let dir = tempfile::tempdir().unwrap();

    let first = manager(dir.path());
    first
        .index_chunks(&[chunk("Skills: Python, Go.", 0, 1)])
        .await
        .unwrap();
    drop(first);

    let second = manager(dir.path());
    assert!(second.load().await.unwrap());
    assert_eq!(second.count().await.unwrap(), 1);

    let results = second.retrieve("skills", 6, 10).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].content, "Skills: Python, Go.");
}

#[tokio::test]
async fn test_append_preserves_existing_entries() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(dir.path());

    manager
        .index_chunks(&[chunk("first document text", 0, 1)])
        .await
        .unwrap();
    manager
        .index_chunks(&[chunk("second document text", 0, 1)])
        .await
        .unwrap();

    assert_eq!(manager.count().await.unwrap(), 2);
}

#[tokio::test]
async fn test_append_matches_building_all_at_once() {
    let dir_incremental = tempfile::tempdir().unwrap();
    let dir_batch = tempfile::tempdir().unwrap();

    let chunks = vec![
        chunk("alpha text about rust", 0, 3),
        chunk("beta text about python", 1, 3),
        chunk("gamma text about go", 2, 3),
    ];

    let incremental = manager(dir_incremental.path());
    incremental.index_chunks(&chunks[..2]).await.unwrap();
    incremental.index_chunks(&chunks[2..]).await.unwrap();

    let batch = manager(dir_batch.path());
    batch.index_chunks(&chunks).await.unwrap();

    // same retrievable set either way
    assert_eq!(incremental.count().await.unwrap(), 3);
    assert_eq!(batch.count().await.unwrap(), 3);
    for query in ["rust", "python", "go"] {
        let a = incremental.retrieve(query, 1, 10).await.unwrap();
        let b = batch.retrieve(query, 1, 10).await.unwrap();
        assert_eq!(a[0].content, b[0].content, "query '{}' diverged", query);
    }
}

#[tokio::test]
async fn test_clear_then_load_reports_absent_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(dir.path());

    manager
        .index_chunks(&[chunk("some content", 0, 1)])
        .await
        .unwrap();
    assert!(manager.load().await.unwrap());

    manager.clear().await.unwrap();
    assert!(!manager.load().await.unwrap());
    assert!(manager.retrieve("some content", 6, 10).await.unwrap().is_empty());

    // second clear on the already-empty store succeeds
    manager.clear().await.unwrap();
    assert!(!manager.load().await.unwrap());
}

#[tokio::test]
async fn test_corrupt_snapshot_self_heals_to_absent() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("store");

    tokio::fs::create_dir_all(&store_dir).await.unwrap();
    tokio::fs::write(store_dir.join("index.bin"), b"definitely not bincode")
        .await
        .unwrap();

    let manager = IndexManager::new(&store_dir, Arc::new(HashEmbedder::default()));
    assert!(!manager.load().await.unwrap());
    assert!(manager.retrieve("anything", 6, 10).await.unwrap().is_empty());

    // the corrupt snapshot was deleted, not left behind
    assert!(!store_dir.join("index.bin").exists());
}

#[tokio::test]
async fn test_concurrent_uploads_both_fully_indexed() {
    let dir = tempfile::tempdir().unwrap();
    let manager = Arc::new(IndexManager::new(
        dir.path().join("store"),
        Arc::new(HashEmbedder::default()),
    ));

    let first: Vec<_> = (0..5)
        .map(|i| chunk(&format!("resume section number {}", i), i, 5))
        .collect();
    let second: Vec<_> = (0..5)
        .map(|i| chunk(&format!("report paragraph number {}", i), i, 5))
        .collect();

    let m1 = manager.clone();
    let m2 = manager.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { m1.index_chunks(&first).await }),
        tokio::spawn(async move { m2.index_chunks(&second).await }),
    );
    assert_eq!(a.unwrap().unwrap(), 5);
    assert_eq!(b.unwrap().unwrap(), 5);

    assert_eq!(manager.count().await.unwrap(), 10);

    // the persisted snapshot also reflects both parties
    let reopened = IndexManager::new(
        dir.path().join("store"),
        Arc::new(HashEmbedder::default()),
    );
    assert_eq!(reopened.count().await.unwrap(), 10);
}

#[tokio::test]
async fn test_retrieve_caps_results_at_k() {
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(dir.path());

    let chunks: Vec<_> = (0..12)
        .map(|i| chunk(&format!("filler text block {}", i), i, 12))
        .collect();
    manager.index_chunks(&chunks).await.unwrap();

    let results = manager.retrieve("filler text", 6, 10).await.unwrap();
    assert_eq!(results.len(), 6);
}
