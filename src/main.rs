// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use docqa_node::{
    api::{start_server, AppState},
    config::{EmbeddingProvider, ServiceConfig},
    inference::OllamaGenerator,
    rag::{AnswerEngine, ChunkerConfig, ConversationStore},
    vector::{Embedder, HashEmbedder, IndexManager, OllamaEmbedder},
};
use std::{env, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::from_env();
    tracing::info!(
        "Starting document QA service (store: {}, model: {})",
        config.store_dir.display(),
        config.generation_model
    );

    let chunker = ChunkerConfig::new(config.chunk_size, config.chunk_overlap)
        .map_err(|e| anyhow::anyhow!("invalid chunker config: {}", e))?;

    let embedder: Arc<dyn Embedder> = match config.embedding_provider {
        EmbeddingProvider::Ollama => Arc::new(OllamaEmbedder::new(
            &config.ollama_url,
            &config.embedding_model,
            config.embedding_dimension,
            config.generation_timeout,
        )?),
        EmbeddingProvider::Hash => {
            tracing::warn!("Using deterministic hash embedder, retrieval quality is degraded");
            Arc::new(HashEmbedder::new(config.embedding_dimension))
        }
    };

    let generator = Arc::new(OllamaGenerator::new(
        &config.ollama_url,
        &config.generation_model,
        config.generation_timeout,
    )?);

    let store = Arc::new(ConversationStore::new());
    let index = Arc::new(IndexManager::new(config.store_dir.clone(), embedder));

    if index.load().await? {
        tracing::info!("Loaded existing vector index ({} entries)", index.count().await?);
    } else {
        tracing::info!("No persisted vector index, waiting for first upload");
    }

    let engine = Arc::new(
        AnswerEngine::new(store.clone(), index.clone(), generator)
            .with_retrieval(config.retrieve_k, config.fetch_k),
    );

    let state = AppState {
        store,
        index,
        engine,
        chunker,
    };

    start_server(state, &config).await
}
