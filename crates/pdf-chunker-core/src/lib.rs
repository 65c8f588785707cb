//! # PDF Chunker Core
//!
//! Shared, I/O-free logic for PDF Chunker: the chunk data model, text
//! normalization, header-aware section splitting, overlapping window
//! splitting, chunk assembly, and projection into index records.
//!
//! This crate contains no tokio, reqwest, filesystem I/O, or other
//! native-only dependencies. Every function is a synchronous, deterministic
//! transformation of its inputs.
//!
//! ## Pipeline
//!
//! ```text
//! raw text ──▶ normalize ──▶ split_sections ──▶ split_windows ──▶ assemble ──▶ to_record
//!                              (## / ###)        (oversized only)   (ids)        (flat JSON)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pdf_chunker_core::{assemble, build_records, normalize_text, ChunkOptions};
//!
//! let text = normalize_text("## Intro\n\n\n\nHello   world.");
//! let chunks = assemble(&text, "report", "report.pdf", &ChunkOptions::default()).unwrap();
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].chunk_id, "report_c0");
//! assert_eq!(chunks[0].section_heading.as_deref(), Some("Intro"));
//!
//! let records = build_records(&chunks);
//! assert_eq!(records[0].title, "Intro");
//! ```

pub mod assemble;
pub mod error;
pub mod models;
pub mod normalize;
pub mod project;
pub mod section;
pub mod window;

pub use assemble::{assemble, ChunkOptions};
pub use error::ChunkError;
pub use models::{Chunk, ChunkRecord, ElementType, RawElement};
pub use normalize::normalize_text;
pub use project::{build_records, to_record};
pub use section::{extract_heading, split_sections};
pub use window::split_windows;
