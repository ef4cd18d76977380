// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Answer post-processing
//!
//! Raw model output is normalized for readability: each bullet starts on
//! its own visually separated line, blank-line runs collapse to exactly
//! one, and remaining whitespace runs become single spaces.

use regex::Regex;
use std::sync::OnceLock;

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // sentence end followed by a dash or bullet marker
    RE.get_or_init(|| Regex::new(r"([.!?])\s*[-•]\s*").expect("static pattern"))
}

fn blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*\n\s*\n\s*").expect("static pattern"))
}

fn spaces_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // horizontal whitespace only; newlines carry the paragraph structure
    RE.get_or_init(|| Regex::new(r"[^\S\n]+").expect("static pattern"))
}

/// Normalize a raw model answer for display
pub fn format_answer(answer: &str) -> String {
    let bulleted = bullet_re().replace_all(answer, "$1\n\n• ");
    let collapsed = blank_lines_re().replace_all(&bulleted, "\n\n");
    let spaced = spaces_re().replace_all(&collapsed, " ");
    spaced.trim().to_string()
}
