// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vector index lifecycle manager
//!
//! Owns the persisted embedding index: lazy load, create-or-append,
//! atomic persist, clear, and retrieval. The persisted form is a single
//! bincode snapshot at `<store_dir>/index.bin`, written to a temporary
//! path and renamed so a concurrent reader never observes a partial write.
//!
//! Concurrency discipline: one `RwLock` guards the cached index. Writers
//! (`index_chunks`, `clear`) hold the write lock across the whole
//! load-modify-persist sequence; embedding happens before the lock is
//! taken so the critical section stays short. Retrievals share the read
//! lock and run in parallel.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::rag::chunker::DocumentChunk;
use crate::rag::errors::RagError;
use crate::vector::embeddings::Embedder;
use crate::vector::index::FlatIndex;

const SNAPSHOT_FILE: &str = "index.bin";

/// Cached handle to the persisted index
#[derive(Debug)]
enum CachedIndex {
    /// Disk not consulted yet
    NotLoaded,
    /// No persisted index exists
    Absent,
    Loaded(FlatIndex),
}

/// Retrieval defaults
pub const DEFAULT_RETRIEVE_K: usize = 6;
pub const DEFAULT_FETCH_K: usize = 10;

/// Manager for the process-wide vector index
pub struct IndexManager {
    store_dir: PathBuf,
    embedder: Arc<dyn Embedder>,
    index: RwLock<CachedIndex>,
}

impl IndexManager {
    pub fn new(store_dir: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store_dir: store_dir.into(),
            embedder,
            index: RwLock::new(CachedIndex::NotLoaded),
        }
    }

    fn snapshot_path(&self) -> PathBuf {
        self.store_dir.join(SNAPSHOT_FILE)
    }

    /// Whether a persisted index exists (loading it if not yet cached)
    pub async fn load(&self) -> Result<bool, RagError> {
        let mut guard = self.index.write().await;
        self.ensure_loaded(&mut guard).await?;
        Ok(matches!(*guard, CachedIndex::Loaded(_)))
    }

    /// Number of retrievable entries, 0 when no index exists
    pub async fn count(&self) -> Result<usize, RagError> {
        let mut guard = self.index.write().await;
        self.ensure_loaded(&mut guard).await?;
        Ok(match &*guard {
            CachedIndex::Loaded(index) => index.len(),
            _ => 0,
        })
    }

    /// Embed chunks and insert them, creating the index on first upload and
    /// appending on later ones. Existing entries are never disturbed. The
    /// updated snapshot is persisted before the write lock is released, so
    /// concurrent uploads serialize and neither party's insertions are lost.
    ///
    /// # Returns
    ///
    /// Number of chunks inserted.
    pub async fn index_chunks(&self, chunks: &[DocumentChunk]) -> Result<usize, RagError> {
        if chunks.is_empty() {
            return Ok(0);
        }

        // embed outside the critical section; this is the slow part
        let mut embedded = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = self.embedder.embed(&chunk.content).await?;
            embedded.push((Uuid::new_v4().to_string(), vector, chunk.clone()));
        }

        let mut guard = self.index.write().await;
        self.ensure_loaded(&mut guard).await?;

        if !matches!(*guard, CachedIndex::Loaded(_)) {
            *guard = CachedIndex::Loaded(FlatIndex::new());
        }
        let index = match &mut *guard {
            CachedIndex::Loaded(index) => index,
            _ => unreachable!("index was just created"),
        };

        let inserted = embedded.len();
        for (id, vector, chunk) in embedded {
            index.insert(id, vector, chunk);
        }

        self.persist(index).await?;
        tracing::info!(
            "Indexed {} chunks ({} total entries)",
            inserted,
            index.len()
        );

        Ok(inserted)
    }

    /// Retrieve the `k` most similar chunks for a query
    ///
    /// Embeds the query, ranks a candidate pool of `fetch_k` entries by
    /// cosine similarity, and returns the top `k` in descending order.
    /// An absent index yields an empty result, never an error.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
        fetch_k: usize,
    ) -> Result<Vec<DocumentChunk>, RagError> {
        {
            let mut guard = self.index.write().await;
            self.ensure_loaded(&mut guard).await?;
            if !matches!(*guard, CachedIndex::Loaded(_)) {
                return Ok(Vec::new());
            }
        }

        let query_vector = self.embedder.embed(query).await?;

        let guard = self.index.read().await;
        let index = match &*guard {
            CachedIndex::Loaded(index) => index,
            // cleared between the embed and the read lock
            _ => return Ok(Vec::new()),
        };

        let mut candidates = index.search(&query_vector, fetch_k);
        candidates.truncate(k);

        Ok(candidates.into_iter().map(|s| s.chunk).collect())
    }

    /// Irrecoverably delete the persisted index and the cached handle.
    /// Calling on an already-empty store is a no-op success.
    pub async fn clear(&self) -> Result<(), RagError> {
        let mut guard = self.index.write().await;
        *guard = CachedIndex::Absent;

        match tokio::fs::remove_dir_all(&self.store_dir).await {
            Ok(()) => {
                tracing::info!("Cleared vector store at {}", self.store_dir.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RagError::Io(e)),
        }
    }

    /// Populate the cache from disk if it has not been consulted yet
    async fn ensure_loaded(&self, guard: &mut CachedIndex) -> Result<(), RagError> {
        if !matches!(*guard, CachedIndex::NotLoaded) {
            return Ok(());
        }
        *guard = match self.load_snapshot().await? {
            Some(index) => CachedIndex::Loaded(index),
            None => CachedIndex::Absent,
        };
        Ok(())
    }

    /// Read the persisted snapshot. A corrupt snapshot is deleted and
    /// treated as absent (logged once here), never propagated upward.
    async fn load_snapshot(&self) -> Result<Option<FlatIndex>, RagError> {
        let path = self.snapshot_path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RagError::Io(e)),
        };

        match bincode::deserialize::<FlatIndex>(&bytes) {
            Ok(index) => {
                tracing::debug!(
                    "Loaded index snapshot with {} entries from {}",
                    index.len(),
                    path.display()
                );
                Ok(Some(index))
            }
            Err(e) => {
                tracing::warn!(
                    "Corrupt index snapshot at {}, deleting and starting empty: {}",
                    path.display(),
                    e
                );
                let _ = tokio::fs::remove_dir_all(&self.store_dir).await;
                Ok(None)
            }
        }
    }

    /// Write the snapshot atomically: serialize, write to a temporary
    /// sibling, rename over the live file.
    async fn persist(&self, index: &FlatIndex) -> Result<(), RagError> {
        let bytes = bincode::serialize(index)
            .map_err(|e| RagError::IndexCorruption(format!("snapshot encode failed: {}", e)))?;

        tokio::fs::create_dir_all(&self.store_dir).await?;
        let tmp_path = self.store_dir.join(format!("{}.tmp", SNAPSHOT_FILE));
        tokio::fs::write(&tmp_path, &bytes).await?;
        tokio::fs::rename(&tmp_path, self.snapshot_path()).await?;

        Ok(())
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }
}
