// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Question augmentation for retrieval recall
//!
//! Common question shapes get a retrieval-oriented enhancement prepended
//! before embedding, without discarding the literal question text. Rules
//! are an ordered list of (matcher, enhancement) pairs evaluated
//! first-match-wins, kept as data so each rule is independently testable.

use regex::Regex;

/// One rewrite rule: if `pattern` matches the lower-cased question, the
/// enhancement is prepended.
#[derive(Debug)]
pub struct RewriteRule {
    pattern: Regex,
    enhancement: &'static str,
}

/// Ordered first-match-wins rule table
#[derive(Debug)]
pub struct QuestionRewriter {
    rules: Vec<RewriteRule>,
}

impl Default for QuestionRewriter {
    fn default() -> Self {
        let table: &[(&str, &str)] = &[
            (
                r"what.*projects?",
                "What projects, work experience, or technical implementations are mentioned?",
            ),
            (
                r"what.*skills?",
                "What technical skills, programming languages, tools, or competencies are listed?",
            ),
            (
                r"what.*experience?",
                "What work experience, internships, or professional background is described?",
            ),
            (
                r"what.*education?",
                "What educational background, degrees, or academic achievements are mentioned?",
            ),
            ("tell me about", "Provide a comprehensive summary about"),
            (
                r"what can you deduce",
                "Analyze and summarize the key information to determine",
            ),
            (
                r"who is",
                "Based on the document, describe the person including their background and qualifications",
            ),
        ];

        let rules = table
            .iter()
            .map(|(pattern, enhancement)| RewriteRule {
                // patterns are fixed literals, compiled once at construction
                pattern: Regex::new(pattern).expect("static rewrite pattern must compile"),
                enhancement,
            })
            .collect();

        Self { rules }
    }
}

impl QuestionRewriter {
    /// Augment a question for retrieval. The first matching rule's
    /// enhancement is prepended to the trimmed original; no match returns
    /// the question unchanged.
    pub fn augment(&self, question: &str) -> String {
        let question = question.trim();
        let lowered = question.to_lowercase();

        for rule in &self.rules {
            if rule.pattern.is_match(&lowered) {
                return format!("{} {}", rule.enhancement, question);
            }
        }

        question.to_string()
    }
}
