// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod chunker;
pub mod conversation;
pub mod engine;
pub mod errors;
pub mod format;
pub mod prompt;
pub mod question;

pub use chunker::{ChunkMetadata, ChunkerConfig, DocumentChunk};
pub use conversation::{ConversationStore, DocumentSummary, Role, Turn};
pub use engine::{Answer, AnswerEngine};
pub use errors::RagError;
pub use question::QuestionRewriter;
