//! `pdfchunk search`: query the index and print ranked chunks.

use anyhow::Result;

use crate::config::IndexConfig;
use crate::index::{ChunkIndex, SearchHit, SearchMode, SearchRequest};

/// Excerpt length shown per hit, in characters.
const EXCERPT_CHARS: usize = 200;

/// Hybrid when the index has an embedder, keyword otherwise.
pub fn default_mode(config: &IndexConfig) -> SearchMode {
    if config.embedder.is_some() {
        SearchMode::Hybrid
    } else {
        SearchMode::Keyword
    }
}

pub async fn run_search(index: &dyn ChunkIndex, request: &SearchRequest) -> Result<()> {
    if request.query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let hits = index.search(request).await?;
    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, hit) in hits.iter().enumerate() {
        println!("{}", format_hit(i + 1, hit));
    }
    Ok(())
}

/// `rank. [score] id | title | excerpt` on one line.
pub fn format_hit(rank: usize, hit: &SearchHit) -> String {
    let title = if hit.title.is_empty() {
        "(untitled)"
    } else {
        hit.title.as_str()
    };
    let score = hit
        .score
        .map(|s| format!("[{:.2}] ", s))
        .unwrap_or_default();
    format!(
        "{}. {}{} | {} | {}",
        rank,
        score,
        hit.id,
        title,
        excerpt(&hit.chunk_text, EXCERPT_CHARS)
    )
}

/// Single-line excerpt of at most `max_chars` characters plus `...`.
fn excerpt(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match flat.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &flat[..cut]),
        None => flat,
    }
}
