//! Pipeline orchestration.
//!
//! Coordinates the full flow: convert → normalize → chunk → build records →
//! optional JSON export → optional index load. Conversion and indexing are
//! injected as trait objects so the chunking steps never depend on which
//! services are behind them.

use anyhow::{bail, Context, Result};
use pdf_chunker_core::{assemble, build_records, normalize_text, ChunkRecord};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::export::{read_records, write_records};
use crate::extract::{doc_id_for, source_file_for, DocumentConverter};
use crate::index::ChunkIndex;

/// Normalize, chunk, and project already-converted text.
pub fn chunk_document(
    config: &Config,
    doc_id: &str,
    source_file: &str,
    raw_text: &str,
) -> Result<Vec<ChunkRecord>> {
    let text = normalize_text(raw_text);
    let chunks = assemble(&text, doc_id, source_file, &config.chunking.options())?;
    Ok(build_records(&chunks))
}

/// Chunk a text or markdown file that was converted elsewhere.
///
/// The document id is the file stem, as for PDFs.
pub fn chunk_text_file(config: &Config, path: &Path) -> Result<Vec<ChunkRecord>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    chunk_document(config, &doc_id_for(path), &source_file_for(path), &raw)
}

/// Run the whole pipeline for one PDF and return the records.
///
/// Records are written to `output` when given and loaded into `index` when
/// given; both happen only after chunking has fully succeeded.
pub async fn run_pipeline(
    config: &Config,
    pdf: &Path,
    converter: &dyn DocumentConverter,
    index: Option<&dyn ChunkIndex>,
    output: Option<&Path>,
) -> Result<Vec<ChunkRecord>> {
    if !pdf.is_file() {
        bail!("PDF not found: {}", pdf.display());
    }

    let started = Instant::now();
    tracing::info!(target: "run_pipeline", file = %pdf.display(), "starting pipeline");

    tracing::info!(target: "run_pipeline", backend = converter.name(), "step 1/4: convert PDF");
    let step = Instant::now();
    let converted = converter
        .convert(pdf)
        .await
        .with_context(|| format!("Failed to convert {}", pdf.display()))?;
    let raw = converted.text();
    tracing::info!(
        target: "run_pipeline",
        chars = raw.chars().count(),
        elapsed_ms = step.elapsed().as_millis() as u64,
        "converted"
    );

    tracing::info!(target: "run_pipeline", "step 2/4: normalize text");
    let text = normalize_text(&raw);

    let options = config.chunking.options();
    tracing::info!(
        target: "run_pipeline",
        max_chars = options.max_chars,
        overlap_chars = options.overlap_chars,
        "step 3/4: chunk"
    );
    let chunks = assemble(&text, &converted.doc_id, &converted.source_file, &options)?;

    let records = build_records(&chunks);
    tracing::info!(target: "run_pipeline", records = records.len(), "step 4/4: build records");

    if let Some(path) = output {
        write_records(&records, Some(path))?;
    }

    if let Some(index) = index {
        tracing::info!(target: "run_pipeline", index = index.name(), "loading records");
        index
            .ingest(&records)
            .await
            .with_context(|| format!("Failed to load records into index '{}'", index.name()))?;
    }

    tracing::info!(
        target: "run_pipeline",
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pipeline finished"
    );
    Ok(records)
}

/// Load a previously exported records file into `index`.
pub async fn load_records_file(index: &dyn ChunkIndex, path: &Path) -> Result<usize> {
    let records = read_records(path)?;
    index
        .ingest(&records)
        .await
        .with_context(|| format!("Failed to load records into index '{}'", index.name()))?;
    Ok(records.len())
}
