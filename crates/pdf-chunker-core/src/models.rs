//! Core data models used throughout PDF Chunker.
//!
//! These types represent the converted document elements, the chunks the
//! assembler emits, and the flat records handed to a search index.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification tag of a converted element or chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    #[default]
    Text,
    Table,
    FigureCaption,
    Title,
    SectionHeader,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Text => "text",
            ElementType::Table => "table",
            ElementType::FigureCaption => "figure_caption",
            ElementType::Title => "title",
            ElementType::SectionHeader => "section_header",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of content produced by a document converter (paragraph,
/// table, caption, ...). Read-only input to the chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawElement {
    pub text: String,
    pub page: Option<u32>,
    pub element_type: ElementType,
    pub source_file: String,
}

/// One retrieval unit to be indexed. May span several raw elements.
///
/// Created once by [`assemble`](crate::assemble::assemble) and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// `{doc_id}_c{n}`, with `n` counting from zero across the document.
    pub chunk_id: String,
    pub doc_id: String,
    /// Trimmed, never empty.
    pub chunk_text: String,
    /// Always `None` today: converters do not report per-chunk pages.
    pub page: Option<u32>,
    pub element_type: ElementType,
    pub source_file: String,
    pub section_heading: Option<String>,
}

/// Flat record consumed by the search index.
///
/// Field names and types are part of the index contract and must not
/// change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub id: String,
    pub doc_id: String,
    pub chunk_text: String,
    /// Section heading, or `""` when the chunk has none.
    pub title: String,
    pub page: Option<u32>,
    pub element_type: ElementType,
    pub source_file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_defaults_to_text() {
        assert_eq!(ElementType::default(), ElementType::Text);
    }

    #[test]
    fn element_type_serializes_snake_case() {
        let json = serde_json::to_string(&ElementType::FigureCaption).unwrap();
        assert_eq!(json, "\"figure_caption\"");
        let parsed: ElementType = serde_json::from_str("\"section_header\"").unwrap();
        assert_eq!(parsed, ElementType::SectionHeader);
    }

    #[test]
    fn element_type_display_matches_serde() {
        for ty in [
            ElementType::Text,
            ElementType::Table,
            ElementType::FigureCaption,
            ElementType::Title,
            ElementType::SectionHeader,
        ] {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty));
        }
    }
}
