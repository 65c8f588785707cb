//! Write chunk records as JSON, and read them back.
//!
//! The exported file is a pretty-printed JSON array of
//! [`ChunkRecord`]s, ready to be posted to a search index as is. Non-ASCII
//! text is written verbatim.

use anyhow::{Context, Result};
use pdf_chunker_core::ChunkRecord;
use std::path::{Path, PathBuf};

/// Default output next to the input: `manual.pdf` → `manual.chunks.json`.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("chunks.json")
}

/// Write records as JSON.
///
/// If `output` is `Some`, writes to that file path (creating parent
/// directories). Otherwise writes to stdout for piping.
pub fn write_records(records: &[ChunkRecord], output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(records)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
            }
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                records = records.len(),
                size = %format_bytes(json.len() as u64),
                path = %path.display(),
                "wrote chunk records"
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Read a file produced by [`write_records`].
pub fn read_records(path: &Path) -> Result<Vec<ChunkRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse chunk records in {}", path.display()))
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
