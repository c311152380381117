// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Content chunking for embedding and retrieval.
//!
//! Documents are split into overlapping fixed-size segments measured in
//! characters. Windows prefer to end on whitespace when one is available in
//! the back half of the window, but never exceed the configured size, and
//! consecutive chunks always share the configured overlap.

use crate::ingest::Document;
use crate::vector::RecordMetadata;

/// A chunk of document text ready for embedding.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    /// Position of this chunk within its document
    pub sequence: usize,
    pub metadata: RecordMetadata,
}

/// Chunk a document, attaching its source metadata to every chunk.
pub fn chunk_document(doc: &Document, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    split_text(&doc.content, chunk_size, overlap)
        .into_iter()
        .enumerate()
        .map(|(sequence, text)| Chunk {
            text,
            sequence,
            metadata: RecordMetadata {
                source: doc.filename.clone(),
                doc_type: doc.doc_type.clone(),
            },
        })
        .collect()
}

/// Split text into overlapping chunks using a sliding window over characters.
///
/// Every chunk is at most `chunk_size` characters; the window advances by
/// `chunk - overlap` characters so consecutive chunks share `overlap`
/// characters of context. Windows are always aligned to character
/// boundaries, never mid code point.
pub fn split_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    let overlap = overlap.min(chunk_size.saturating_sub(1));

    // Byte offset of every character boundary, including the end of string
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = bounds.len() - 1;

    if total_chars <= chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < total_chars {
        let hard_end = (start + chunk_size).min(total_chars);
        let end = if hard_end < total_chars {
            find_break(text, &bounds, start, hard_end)
        } else {
            hard_end
        };

        let piece = text[bounds[start]..bounds[end]].trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        if end == total_chars {
            break;
        }
        let step = end - start;
        start = if step <= overlap { end } else { end - overlap };
    }

    chunks
}

/// Find a whitespace break in the back half of the window, falling back to a
/// hard cut at the window edge. Offsets are character indices.
fn find_break(text: &str, bounds: &[usize], start: usize, hard_end: usize) -> usize {
    let window = &text[bounds[start]..bounds[hard_end]];
    if let Some(byte_pos) = window.rfind(char::is_whitespace) {
        let char_offset = window[..byte_pos].chars().count();
        // break just after the whitespace, but only if it keeps the chunk
        // reasonably full
        if 2 * char_offset >= hard_end - start {
            return start + char_offset + 1;
        }
    }
    hard_end
}
