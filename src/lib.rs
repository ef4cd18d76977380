// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod inference;
pub mod rag;
pub mod vector;

// Re-export main types
pub use api::{AppState, ChatRequest, ChatResponse, UploadResponse};
pub use config::{EmbeddingProvider, ServiceConfig};
pub use inference::{GenerationError, OllamaGenerator, TextGenerator};
pub use rag::{
    Answer, AnswerEngine, ChunkMetadata, ChunkerConfig, ConversationStore, DocumentChunk,
    QuestionRewriter, RagError, Role,
};
pub use vector::{Embedder, FlatIndex, HashEmbedder, IndexManager, OllamaEmbedder};
