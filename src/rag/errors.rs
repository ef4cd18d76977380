// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Error types for the RAG pipeline
//!
//! Covers the full taxonomy seen at the API boundary:
//! - Validation errors (bad upload type, bad chunker config)
//! - Document parse errors (unreadable PDF)
//! - Index corruption (self-healed internally, logged, never client-visible)
//! - Generation errors (model call failure or timeout)

use thiserror::Error;

use crate::vector::embeddings::EmbeddingError;

/// Errors produced by the document QA pipeline
#[derive(Error, Debug)]
pub enum RagError {
    /// Request rejected before any work was done
    #[error("Validation error: {0}")]
    Validation(String),

    /// Source bytes could not be parsed as a document; no partial chunks
    /// are ever returned alongside this error
    #[error("Failed to parse document: {0}")]
    DocumentParse(String),

    /// Persisted index snapshot was unreadable. The store self-heals by
    /// deleting the snapshot and treating the index as absent, so this
    /// variant never crosses the API boundary.
    #[error("Index snapshot corrupt: {0}")]
    IndexCorruption(String),

    /// Generation model call failed (unreachable, malformed response, or
    /// bounded timeout expired)
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Embedding model call failed
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagError {
    /// User-friendly message for API error payloads
    pub fn user_message(&self) -> String {
        match self {
            RagError::Validation(msg) => msg.clone(),
            RagError::DocumentParse(_) => {
                "The uploaded file could not be read as a PDF".to_string()
            }
            RagError::Generation(_) => {
                "The answer model is unavailable, please retry".to_string()
            }
            other => other.to_string(),
        }
    }
}
