// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Env-var driven with working defaults, read once at startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Which embedding backend to construct at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Ollama `/api/embeddings`
    Ollama,
    /// Deterministic local hash embedder, for offline runs and tests
    Hash,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_port: u16,
    pub store_dir: PathBuf,
    pub ollama_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    pub embedding_provider: EmbeddingProvider,
    pub embedding_dimension: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub retrieve_k: usize,
    pub fetch_k: usize,
    pub generation_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_port: 8080,
            store_dir: PathBuf::from("vector_store"),
            ollama_url: "http://127.0.0.1:11434".to_string(),
            generation_model: "llama3.2:3b".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            embedding_provider: EmbeddingProvider::Ollama,
            embedding_dimension: 768,
            chunk_size: 800,
            chunk_overlap: 100,
            retrieve_k: 6,
            fetch_k: 10,
            generation_timeout: Duration::from_secs(60),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let embedding_provider = match env::var("EMBEDDING_PROVIDER").as_deref() {
            Ok("hash") => EmbeddingProvider::Hash,
            _ => EmbeddingProvider::Ollama,
        };

        Self {
            api_port: parse_env("API_PORT", defaults.api_port),
            store_dir: env::var("STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_dir),
            ollama_url: env::var("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            generation_model: env::var("GENERATION_MODEL").unwrap_or(defaults.generation_model),
            embedding_model: env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_provider,
            embedding_dimension: parse_env("EMBEDDING_DIMENSION", defaults.embedding_dimension),
            chunk_size: parse_env("CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: parse_env("CHUNK_OVERLAP", defaults.chunk_overlap),
            retrieve_k: parse_env("RETRIEVE_K", defaults.retrieve_k),
            fetch_k: parse_env("FETCH_K", defaults.fetch_k),
            generation_timeout: Duration::from_secs(parse_env(
                "GENERATION_TIMEOUT_SECS",
                defaults.generation_timeout.as_secs(),
            )),
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
