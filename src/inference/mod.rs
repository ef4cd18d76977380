// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generation model seam
//!
//! The large-language model is an opaque collaborator behind the
//! [`TextGenerator`] trait: `generate(prompt) -> text`. The shipped
//! implementation talks to an Ollama server; tests script their own.

pub mod ollama;

use async_trait::async_trait;
use thiserror::Error;

pub use ollama::{OllamaGenerator, SamplingOptions};

/// Generation model call failure: unreachable endpoint, non-success
/// status, malformed body, or bounded timeout expiry.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Request(String),
    #[error("Generation timed out after {0}s")]
    Timeout(u64),
    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

/// Opaque text generation model
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}
