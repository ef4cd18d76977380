// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Flat in-memory vector index
//!
//! Maps chunk identity to (embedding vector, chunk). A single flat index
//! serves the whole corpus; retrieval is an exhaustive cosine-similarity
//! scan, which is the right trade at this corpus size.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::rag::chunker::DocumentChunk;
use crate::vector::embeddings::Embedding;

/// Entry stored in the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub chunk: DocumentChunk,
}

/// A scored retrieval hit
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Flat index over the whole document corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlatIndex {
    entries: HashMap<String, IndexEntry>,
}

impl FlatIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh index from (id, entry) pairs
    pub fn from_entries(entries: impl IntoIterator<Item = (String, IndexEntry)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Insert an entry. Append semantics: ids are fresh per insertion, and
    /// existing entries are never removed or updated by an append.
    pub fn insert(&mut self, id: String, vector: Vec<f32>, chunk: DocumentChunk) {
        self.entries.insert(id, IndexEntry { vector, chunk });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of every retrievable entry
    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Content of every retrievable chunk, for set comparisons in tests
    pub fn contents(&self) -> Vec<&str> {
        self.entries
            .values()
            .map(|e| e.chunk.content.as_str())
            .collect()
    }

    /// Top-`k` entries by cosine similarity to `query`, descending
    pub fn search(&self, query: &[f32], k: usize) -> Vec<ScoredChunk> {
        if self.entries.is_empty() || k == 0 {
            return Vec::new();
        }

        let query_embedding = Embedding::new(query.to_vec());

        let mut results: Vec<ScoredChunk> = self
            .entries
            .values()
            .map(|entry| {
                let entry_embedding = Embedding::new(entry.vector.clone());
                ScoredChunk {
                    chunk: entry.chunk.clone(),
                    score: query_embedding.cosine_similarity(&entry_embedding),
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        results
    }
}
