// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Document chunker
//!
//! Splits an uploaded PDF into overlapping text segments, the unit of
//! retrieval for the whole pipeline.
//!
//! ## Flow
//!
//! 1. Extract text page by page (`pdf-extract`), one page = one unit
//! 2. Normalize each page: collapse whitespace, strip unsafe characters
//! 3. Split normalized text at natural boundaries (paragraph, line,
//!    sentence, word) with a fixed overlap between consecutive chunks
//! 4. Attach metadata: document name, page number, batch chunk index

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rag::errors::RagError;

/// Split-point preference, tried in order. Falls back to a raw character
/// boundary when a window contains none of these.
const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", " "];

/// Punctuation allowed to survive normalization
const SAFE_PUNCTUATION: &[char] = &['-', '.', ',', ';', ':', '(', ')', '!', '?'];

/// Metadata carried by every chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Source document name, upload filename with the extension stripped
    pub document_name: String,
    /// 1-based page the chunk was cut from
    pub page_number: usize,
    /// Page count of the source document
    pub total_pages: usize,
    /// 0-based index within the upload batch
    pub chunk_index: usize,
    /// Chunk count of the upload batch
    pub total_chunks: usize,
}

/// A retrievable text segment. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

/// Chunker sizing configuration
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    /// Maximum chunk length in characters
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks of the same page
    pub chunk_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 800,
            chunk_overlap: 100,
        }
    }
}

impl ChunkerConfig {
    /// Create a config, enforcing `chunk_overlap < chunk_size`
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, RagError> {
        if chunk_size == 0 {
            return Err(RagError::Validation(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Validation(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }
}

/// Derive the document name from an upload filename (extension stripped)
pub fn document_name(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}

/// Split a PDF into chunks
///
/// # Arguments
///
/// * `name` - Document name to record in chunk metadata
/// * `bytes` - Raw PDF bytes
/// * `config` - Chunk sizing
///
/// # Errors
///
/// Returns `RagError::DocumentParse` if the bytes are not a readable PDF.
/// No partial chunks are returned on failure.
pub fn split_pdf(
    name: &str,
    bytes: &[u8],
    config: ChunkerConfig,
) -> Result<Vec<DocumentChunk>, RagError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| RagError::DocumentParse(format!("{:?}", e)))?;

    Ok(split_pages(name, &pages, config))
}

/// Split already-extracted pages into chunks
///
/// Page-level entry point used by `split_pdf` after extraction; chunk
/// indices are assigned across the whole batch after all pages are cut.
pub fn split_pages(name: &str, pages: &[String], config: ChunkerConfig) -> Vec<DocumentChunk> {
    let total_pages = pages.len();
    let mut chunks = Vec::new();

    for (i, page) in pages.iter().enumerate() {
        let cleaned = clean_text(page);
        for piece in split_text(&cleaned, config.chunk_size, config.chunk_overlap) {
            chunks.push(DocumentChunk {
                content: piece,
                metadata: ChunkMetadata {
                    document_name: name.to_string(),
                    page_number: i + 1,
                    total_pages,
                    chunk_index: 0,
                    total_chunks: 0,
                },
            });
        }
    }

    let total_chunks = chunks.len();
    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.metadata.chunk_index = i;
        chunk.metadata.total_chunks = total_chunks;
    }

    tracing::debug!(
        "Split '{}' into {} chunks across {} pages",
        name,
        total_chunks,
        total_pages
    );

    chunks
}

/// Normalize page text: whitespace runs become single spaces, characters
/// outside word chars / whitespace / the punctuation allowlist become
/// spaces, result is trimmed.
pub fn clean_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        let keep = c.is_alphanumeric() || c == '_' || SAFE_PUNCTUATION.contains(&c);
        if keep {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        } else {
            // whitespace and stripped characters both collapse into one space
            pending_space = true;
        }
    }

    out
}

/// Split normalized text into pieces no longer than `chunk_size` bytes,
/// preferring natural boundaries and carrying `overlap` trailing bytes
/// into the next piece.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut start = 0usize;

    while start < text.len() {
        let remaining = &text[start..];
        if remaining.len() <= chunk_size {
            let piece = remaining.trim();
            if !piece.is_empty() {
                pieces.push(piece.to_string());
            }
            break;
        }

        // a chunk_size below one character's byte width still cuts a
        // whole character, so the loop always advances
        let mut window_end = floor_char_boundary(remaining, chunk_size);
        if window_end == 0 {
            window_end = ceil_char_boundary(remaining, 1);
        }
        let window = &remaining[..window_end];

        // raw character boundary unless a natural split point exists
        let mut end = window_end;
        for sep in SEPARATORS {
            if let Some(pos) = window.rfind(sep) {
                if pos > 0 {
                    end = pos + sep.len();
                    break;
                }
            }
        }

        let piece = remaining[..end].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }

        // step forward, rewinding by the overlap; a short cut cannot rewind
        // past its own start
        let advance = if end > overlap { end - overlap } else { end };
        start += ceil_char_boundary(remaining, advance);
    }

    pieces
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
