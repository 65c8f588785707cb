//! # PDF Chunker
//!
//! Turns PDF documents into search-ready chunk records.
//!
//! A PDF is converted to markdown (or plain text), normalized, split into
//! overlapping heading-aware windows, and projected into flat JSON records
//! that can be exported or loaded into a Meilisearch index.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────────┐   ┌────────────┐
//! │ Converter │──▶│  pdf-chunker-core    │──▶│  Export    │
//! │ docling / │   │ normalize → sections │   │  (JSON)    │
//! │ local     │   │ → windows → records  │   └────────────┘
//! └───────────┘   └──────────┬───────────┘
//!                            ▼
//!                     ┌─────────────┐
//!                     │ Meilisearch │
//!                     └─────────────┘
//! ```
//!
//! The chunking core lives in the I/O-free `pdf-chunker-core` crate; this
//! crate adds configuration, service clients, and the `pdfchunk` CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! pdfchunk run manual.pdf                  # writes manual.chunks.json
//! pdfchunk run manual.pdf --load           # ...and loads it into the index
//! pdfchunk chunk manual.md -o chunks.json  # chunk already-converted text
//! pdfchunk load chunks.json
//! pdfchunk search "seal replacement"    # query what was loaded
//! pdfchunk check                           # probe docling and meilisearch
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`extract`] | PDF conversion backends |
//! | [`pipeline`] | Convert → chunk → export → load orchestration |
//! | [`export`] | JSON record files |
//! | [`index`] | Meilisearch loader |
//! | [`search`] | Keyword, semantic, and hybrid index queries |
//! | [`services`] | Service health checks |

pub mod config;
pub mod export;
pub mod extract;
pub mod index;
pub mod pipeline;
pub mod search;
pub mod services;
