// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prompt assembly for grounded answering
//!
//! A single generation request is built from four blocks: the fixed system
//! instruction, the retrieved chunk text as grounding context, the
//! serialized conversation pairs, and the augmented question. The template
//! tolerates an empty context block so an empty corpus degrades to an
//! ungrounded answer instead of failing.

use crate::rag::chunker::DocumentChunk;

/// Fixed behavioral instruction block for the answering model
pub const SYSTEM_PROMPT: &str = "\
You are an intelligent document analysis assistant. Your role is to analyze and answer questions about the provided documents comprehensively.

INSTRUCTIONS:
1. Always base your answers on the provided context from the documents
2. For general questions about the document, synthesize information from multiple parts
3. When asked about specific topics (projects, skills, experience, etc.), extract and organize relevant information
4. If information is not explicitly stated, mention what can be reasonably inferred
5. Provide detailed, structured responses when appropriate
6. If you cannot find specific information, clearly state this and suggest what might be available

RESPONSE STYLE:
- Be conversational and helpful
- Use bullet points or lists for multiple items
- Provide specific details when available
- Connect related information across the document";

/// Serialize conversation pairs for the history block
pub fn render_history(pairs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (question, answer) in pairs {
        out.push_str(&format!("User: {}\nAssistant: {}\n\n", question, answer));
    }
    out
}

/// Concatenate retrieved chunk text into the grounding context block
pub fn render_context(chunks: &[DocumentChunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Assemble the full generation request
pub fn build_prompt(
    context: &str,
    history: &str,
    question: &str,
) -> String {
    format!(
        "{system_prompt}\n\n\
         DOCUMENT CONTEXT:\n{context}\n\n\
         CONVERSATION HISTORY:\n{history}\n\n\
         CURRENT QUESTION: {question}\n\n\
         DETAILED ANSWER:",
        system_prompt = SYSTEM_PROMPT,
        context = context,
        history = history,
        question = question,
    )
}
