// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! In-memory conversation store
//!
//! Process-wide session state: per-session message history and per-document
//! summaries. Explicitly constructed and injected, guarded by a lock so
//! concurrent appends cannot lose updates. Nothing survives a restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a session's history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Summary of a document uploaded during a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub summary: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct SessionState {
    turns: Vec<Turn>,
    summaries: HashMap<String, DocumentSummary>,
}

/// Process-wide conversation store
#[derive(Debug, Default)]
pub struct ConversationStore {
    sessions: RwLock<HashMap<String, SessionState>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn, creating the session implicitly if absent
    pub async fn append_message(&self, session_id: &str, role: Role, text: &str) {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(session_id.to_string()).or_default();
        state.turns.push(Turn {
            role,
            text: text.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// All turns for a session in insertion order; empty for unknown sessions
    pub async fn history(&self, session_id: &str) -> Vec<(Role, String)> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|state| {
                state
                    .turns
                    .iter()
                    .map(|t| (t.role, t.text.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Full turns including timestamps
    pub async fn full_history(&self, session_id: &str) -> Vec<Turn> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|state| state.turns.clone())
            .unwrap_or_default()
    }

    /// Upsert the summary recorded for a document within a session
    pub async fn store_document_summary(&self, session_id: &str, document: &str, summary: &str) {
        let mut sessions = self.sessions.write().await;
        let state = sessions.entry(session_id.to_string()).or_default();
        state.summaries.insert(
            document.to_string(),
            DocumentSummary {
                summary: summary.to_string(),
                timestamp: Utc::now(),
            },
        );
    }

    /// Summaries of documents uploaded during a session
    pub async fn document_summaries(&self, session_id: &str) -> HashMap<String, DocumentSummary> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|state| state.summaries.clone())
            .unwrap_or_default()
    }

    /// Drop history and summaries for one session; no-op when unknown
    pub async fn clear_session(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
    }

    /// Wipe every session. Administrative reset only.
    pub async fn clear_all(&self) {
        let mut sessions = self.sessions.write().await;
        sessions.clear();
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// Group raw turns into strict alternating (question, answer) pairs.
///
/// Unpaired or out-of-order trailing turns are excluded from the pair list
/// but remain in raw history.
pub fn paired_history(turns: &[(Role, String)]) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut i = 0;
    while i + 1 < turns.len() {
        if turns[i].0 == Role::User && turns[i + 1].0 == Role::Assistant {
            pairs.push((turns[i].1.clone(), turns[i + 1].1.clone()));
        }
        i += 2;
    }
    pairs
}
