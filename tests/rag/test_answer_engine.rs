// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Answering engine tests with scripted generation models

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use docqa_node::inference::{GenerationError, TextGenerator};
use docqa_node::rag::chunker::{ChunkMetadata, DocumentChunk};
use docqa_node::rag::{AnswerEngine, ConversationStore, Role};
use docqa_node::vector::{HashEmbedder, IndexManager};

/// Records the prompt it was called with and returns a canned answer
struct ScriptedGenerator {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Always fails, as an unreachable model server would
struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Request("connection refused".to_string()))
    }
}

fn chunk(content: &str, page: usize) -> DocumentChunk {
    DocumentChunk {
        content: content.to_string(),
        metadata: ChunkMetadata {
            document_name: "resume".to_string(),
            page_number: page,
            total_pages: 2,
            chunk_index: page - 1,
            total_chunks: 2,
        },
    }
}

struct Harness {
    store: Arc<ConversationStore>,
    index: Arc<IndexManager>,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(ConversationStore::new());
    let index = Arc::new(IndexManager::new(
        dir.path().join("store"),
        Arc::new(HashEmbedder::default()),
    ));
    Harness {
        store,
        index,
        _dir: dir,
    }
}

#[tokio::test]
async fn test_answer_records_both_turns_in_order() {
    let h = harness();
    let generator = Arc::new(ScriptedGenerator::new("The skills are Python and Go."));
    let engine = AnswerEngine::new(h.store.clone(), h.index.clone(), generator);

    let answer = engine.answer("s1", "what are the skills?").await.unwrap();
    assert_eq!(answer.text, "The skills are Python and Go.");

    let history = h.store.history("s1").await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], (Role::User, "what are the skills?".to_string()));
    assert_eq!(
        history[1],
        (Role::Assistant, "The skills are Python and Go.".to_string())
    );
}

#[tokio::test]
async fn test_empty_index_degrades_to_ungrounded_answer() {
    let h = harness();
    let generator = Arc::new(ScriptedGenerator::new("I have no documents to cite."));
    let engine = AnswerEngine::new(h.store.clone(), h.index.clone(), generator.clone());

    let answer = engine.answer("s1", "summarize the report").await.unwrap();
    assert_eq!(answer.source_count, 0);
    assert_eq!(answer.text, "I have no documents to cite.");

    // the prompt still carries an (empty) context block
    assert!(generator.last_prompt().contains("DOCUMENT CONTEXT:"));
}

#[tokio::test]
async fn test_failed_generation_keeps_user_turn_only() {
    let h = harness();
    let engine = AnswerEngine::new(h.store.clone(), h.index.clone(), Arc::new(FailingGenerator));

    let result = engine.answer("s1", "anything?").await;
    assert!(result.is_err());

    let history = h.store.history("s1").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].0, Role::User);
}

#[tokio::test]
async fn test_prompt_contains_retrieved_context_and_history_pairs() {
    let h = harness();
    h.index
        .index_chunks(&[chunk("Skills: Python, Go.", 1)])
        .await
        .unwrap();

    let generator = Arc::new(ScriptedGenerator::new("ok"));
    let engine = AnswerEngine::new(h.store.clone(), h.index.clone(), generator.clone());

    // a completed prior exchange plus a trailing unpaired user turn
    h.store.append_message("s1", Role::User, "hello").await;
    h.store.append_message("s1", Role::Assistant, "hi there").await;
    h.store.append_message("s1", Role::User, "dangling").await;

    engine.answer("s1", "what are the skills?").await.unwrap();

    let prompt = generator.last_prompt();
    assert!(prompt.contains("Skills: Python, Go."));
    assert!(prompt.contains("User: hello\nAssistant: hi there"));
    // the unpaired turn stays out of the serialized history block
    assert!(!prompt.contains("User: dangling"));
}

#[tokio::test]
async fn test_augmented_question_reaches_the_prompt_with_original_text() {
    let h = harness();
    let generator = Arc::new(ScriptedGenerator::new("ok"));
    let engine = AnswerEngine::new(h.store.clone(), h.index.clone(), generator.clone());

    engine.answer("s1", "what are the skills?").await.unwrap();

    let prompt = generator.last_prompt();
    assert!(prompt.contains("What technical skills, programming languages"));
    assert!(prompt.contains("what are the skills?"));
}

#[tokio::test]
async fn test_answer_is_formatted_before_recording() {
    let h = harness();
    let generator = Arc::new(ScriptedGenerator::new("Point one.- Point two"));
    let engine = AnswerEngine::new(h.store.clone(), h.index.clone(), generator);

    let answer = engine.answer("s1", "list the points").await.unwrap();
    assert_eq!(answer.text, "Point one.\n\n• Point two");

    let history = h.store.history("s1").await;
    assert_eq!(history[1].1, "Point one.\n\n• Point two");
}

#[tokio::test]
async fn test_source_count_reflects_retrieved_chunks() {
    let h = harness();
    h.index
        .index_chunks(&[
            chunk("Skills: Python, Go.", 1),
            chunk("Experience: 2 years backend.", 2),
        ])
        .await
        .unwrap();

    let generator = Arc::new(ScriptedGenerator::new("ok"));
    let engine = AnswerEngine::new(h.store.clone(), h.index.clone(), generator);

    let answer = engine.answer("s1", "what are the skills?").await.unwrap();
    assert_eq!(answer.source_count, 2);
}
