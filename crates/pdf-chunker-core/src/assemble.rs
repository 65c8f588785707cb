//! Chunk assembly: sections, windows, and stable chunk ids.
//!
//! [`assemble`] is the entry point of the chunking core. It splits
//! normalized text into header-delimited sections, breaks oversized
//! sections into overlapping windows, and numbers the resulting chunks with
//! a single counter that runs across the whole document.
//!
//! # Guarantees
//!
//! - Blank input yields no chunks (not an error).
//! - Chunk ids are `{doc_id}_c0`, `{doc_id}_c1`, … with no gaps, in
//!   document order.
//! - Every `chunk_text` is trimmed and non-empty, and at most `max_chars`
//!   characters long.
//! - Identical inputs produce identical output.

use crate::error::ChunkError;
use crate::models::{Chunk, ElementType};
use crate::section::{extract_heading, split_sections};
use crate::window::{check_limits, split_windows};

/// Chunking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkOptions {
    /// Upper bound on chunk length, in characters.
    pub max_chars: usize,
    /// Characters shared by consecutive windows of one section.
    pub overlap_chars: usize,
    /// Split on `##`/`###` headings and tag chunks with their heading.
    pub split_on_headers: bool,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_chars: 1200,
            overlap_chars: 120,
            split_on_headers: true,
        }
    }
}

impl ChunkOptions {
    /// Fail fast on limits that would loop forever or never fit a chunk.
    pub fn validate(&self) -> Result<(), ChunkError> {
        check_limits(self.max_chars, self.overlap_chars)
    }
}

/// Accumulates chunks for one document and owns the running id counter.
struct ChunkSink<'a> {
    doc_id: &'a str,
    source_file: &'a str,
    next_index: usize,
    chunks: Vec<Chunk>,
}

impl<'a> ChunkSink<'a> {
    fn new(doc_id: &'a str, source_file: &'a str) -> Self {
        Self {
            doc_id,
            source_file,
            next_index: 0,
            chunks: Vec::new(),
        }
    }

    fn push(&mut self, text: &str, heading: Option<&str>) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.chunks.push(Chunk {
            chunk_id: format!("{}_c{}", self.doc_id, self.next_index),
            doc_id: self.doc_id.to_string(),
            chunk_text: text.to_string(),
            page: None,
            element_type: ElementType::Text,
            source_file: self.source_file.to_string(),
            section_heading: heading.map(str::to_string),
        });
        self.next_index += 1;
    }

    fn finish(self) -> Vec<Chunk> {
        self.chunks
    }
}

/// Split normalized `text` into retrieval chunks.
///
/// Sections come from [`split_sections`] when
/// [`split_on_headers`](ChunkOptions::split_on_headers) is set, otherwise
/// the whole text is one section. A section within `max_chars` becomes one
/// chunk; a longer one is cut by [`split_windows`] and every window is
/// tagged with the section's heading.
///
/// # Errors
///
/// [`ChunkError`] if `options` fails [`ChunkOptions::validate`]. Validation
/// happens before any chunk is produced.
pub fn assemble(
    text: &str,
    doc_id: &str,
    source_file: &str,
    options: &ChunkOptions,
) -> Result<Vec<Chunk>, ChunkError> {
    options.validate()?;

    if text.trim().is_empty() {
        tracing::debug!(target: "chunk", doc_id, "empty text, no chunks");
        return Ok(Vec::new());
    }

    let sections = if options.split_on_headers {
        let sections = split_sections(text);
        tracing::debug!(
            target: "chunk",
            sections = sections.len(),
            max_chars = options.max_chars,
            overlap_chars = options.overlap_chars,
            "split by headers"
        );
        sections
    } else {
        tracing::debug!(
            target: "chunk",
            max_chars = options.max_chars,
            overlap_chars = options.overlap_chars,
            "single block, no header split"
        );
        vec![text]
    };

    let mut sink = ChunkSink::new(doc_id, source_file);
    for section in sections {
        let section = section.trim();
        if section.is_empty() {
            continue;
        }
        let heading = if options.split_on_headers {
            extract_heading(section)
        } else {
            None
        };

        if section.chars().count() <= options.max_chars {
            sink.push(section, heading);
        } else {
            for window in split_windows(section, options.max_chars, options.overlap_chars)? {
                sink.push(window, heading);
            }
        }
    }

    let chunks = sink.finish();
    tracing::info!(target: "chunk", doc_id, chunks = chunks.len(), "produced chunks");
    Ok(chunks)
}
