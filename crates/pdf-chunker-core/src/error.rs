//! Chunking configuration errors.

use thiserror::Error;

/// Rejected chunking configuration.
///
/// Raised before any output is produced; the chunker never returns a
/// partial chunk list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChunkError {
    #[error("max_chars must be > 0 (got {max_chars})")]
    InvalidMaxChars { max_chars: usize },

    #[error("overlap_chars ({overlap_chars}) must be smaller than max_chars ({max_chars})")]
    OverlapTooLarge {
        overlap_chars: usize,
        max_chars: usize,
    },
}
