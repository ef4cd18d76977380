// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod embeddings;
pub mod index;
pub mod store;

pub use embeddings::{Embedder, Embedding, EmbeddingError, HashEmbedder, OllamaEmbedder};
pub use index::{FlatIndex, IndexEntry, ScoredChunk};
pub use store::{IndexManager, DEFAULT_FETCH_K, DEFAULT_RETRIEVE_K};
