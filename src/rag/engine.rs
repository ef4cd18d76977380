// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Retrieval-augmented answering engine
//!
//! The retrieve-then-generate flow for one question:
//!
//! 1. Read session history and derive strict (user, assistant) pairs
//! 2. Record the incoming question as a user turn (before generation, so
//!    history survives a downstream generation failure)
//! 3. Augment the question for retrieval recall
//! 4. Retrieve the top-k chunks with the augmented question
//! 5. Assemble the grounded prompt
//! 6. Call the generation model
//! 7. Normalize the raw answer
//! 8. Record the assistant turn
//! 9. Return the answer with the grounding chunk count

use std::sync::Arc;

use crate::inference::TextGenerator;
use crate::rag::conversation::{paired_history, ConversationStore, Role};
use crate::rag::errors::RagError;
use crate::rag::format::format_answer;
use crate::rag::prompt::{build_prompt, render_context, render_history};
use crate::rag::question::QuestionRewriter;
use crate::vector::store::{IndexManager, DEFAULT_FETCH_K, DEFAULT_RETRIEVE_K};

/// A generated answer and the number of chunks that grounded it
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    pub source_count: usize,
}

/// Engine wiring: conversation store, vector index, generation model
pub struct AnswerEngine {
    store: Arc<ConversationStore>,
    index: Arc<IndexManager>,
    generator: Arc<dyn TextGenerator>,
    rewriter: QuestionRewriter,
    retrieve_k: usize,
    fetch_k: usize,
}

impl AnswerEngine {
    pub fn new(
        store: Arc<ConversationStore>,
        index: Arc<IndexManager>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            store,
            index,
            generator,
            rewriter: QuestionRewriter::default(),
            retrieve_k: DEFAULT_RETRIEVE_K,
            fetch_k: DEFAULT_FETCH_K,
        }
    }

    pub fn with_retrieval(mut self, retrieve_k: usize, fetch_k: usize) -> Self {
        self.retrieve_k = retrieve_k;
        self.fetch_k = fetch_k;
        self
    }

    /// Answer a question for a session
    ///
    /// An absent or empty index degrades to an ungrounded answer; a
    /// generation failure returns `RagError::Generation` with the user's
    /// question turn already recorded in history.
    pub async fn answer(&self, session_id: &str, question: &str) -> Result<Answer, RagError> {
        let history = self.store.history(session_id).await;
        let pairs = paired_history(&history);

        // recorded before generation; a failed generation leaves the
        // question in history without its answer
        self.store
            .append_message(session_id, Role::User, question)
            .await;

        let augmented = self.rewriter.augment(question);
        tracing::debug!("Augmented question: {}", augmented);

        let chunks = self
            .index
            .retrieve(&augmented, self.retrieve_k, self.fetch_k)
            .await?;
        let source_count = chunks.len();
        if source_count == 0 {
            tracing::debug!("No grounding chunks for session {}", session_id);
        }

        let prompt = build_prompt(
            &render_context(&chunks),
            &render_history(&pairs),
            &augmented,
        );

        let raw = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| RagError::Generation(e.to_string()))?;

        let formatted = format_answer(&raw);

        self.store
            .append_message(session_id, Role::Assistant, &formatted)
            .await;

        Ok(Answer {
            text: formatted,
            source_count,
        })
    }
}
