//! Overlapping window splitter for oversized sections.
//!
//! # Algorithm
//!
//! Greedy, left to right, measured in characters (not bytes):
//!
//! 1. Start a cursor at 0 and propose a window of `max_chars`.
//! 2. If the proposal reaches the end of the text, the remainder is the
//!    last window.
//! 3. Otherwise look for a natural break inside the proposal. The rules in
//!    [`BREAK_RULES`] are tried in order (paragraph, line, sentence, word);
//!    for each, only the *last* occurrence counts, and it is accepted only
//!    past the rule's minimum position. The window then ends just after
//!    the separator.
//! 4. With no acceptable break the window is cut hard at `max_chars`.
//! 5. The cursor moves to `end - overlap_chars`, so consecutive windows
//!    share exactly `overlap_chars` characters of source text.
//!
//! The minimum position of every rule is at least `overlap_chars`, which
//! guarantees the cursor always moves forward.

use crate::error::ChunkError;

/// A candidate break separator and the minimum position at which it is
/// accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakRule {
    pub separator: &'static str,
    /// The break must lie beyond `max_chars / min_divisor`.
    pub min_divisor: usize,
}

impl BreakRule {
    /// Character position inside a window that a match must exceed.
    pub fn min_position(&self, max_chars: usize, overlap_chars: usize) -> usize {
        (max_chars / self.min_divisor).max(overlap_chars)
    }
}

/// Break rules in priority order.
pub const BREAK_RULES: &[BreakRule] = &[
    BreakRule {
        separator: "\n\n",
        min_divisor: 2,
    },
    BreakRule {
        separator: "\n",
        min_divisor: 2,
    },
    BreakRule {
        separator: ". ",
        min_divisor: 2,
    },
    BreakRule {
        separator: " ",
        min_divisor: 2,
    },
];

/// Reject limits that cannot produce bounded, terminating output.
pub fn check_limits(max_chars: usize, overlap_chars: usize) -> Result<(), ChunkError> {
    if max_chars == 0 {
        return Err(ChunkError::InvalidMaxChars { max_chars });
    }
    if overlap_chars >= max_chars {
        return Err(ChunkError::OverlapTooLarge {
            overlap_chars,
            max_chars,
        });
    }
    Ok(())
}

/// Split `text` into windows of at most `max_chars` characters that
/// overlap by `overlap_chars`.
///
/// Windows are returned untrimmed as slices of `text`, in order. Text that
/// already fits yields a single window; empty text yields none.
///
/// # Errors
///
/// [`ChunkError`] when `max_chars == 0` or `overlap_chars >= max_chars`.
pub fn split_windows(
    text: &str,
    max_chars: usize,
    overlap_chars: usize,
) -> Result<Vec<&str>, ChunkError> {
    check_limits(max_chars, overlap_chars)?;

    // Byte offset of every char, plus the end of the text.
    let offsets: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = offsets.len() - 1;

    let mut windows = Vec::new();
    let mut start = 0;
    while start < total_chars {
        let tentative_end = start + max_chars;
        if tentative_end >= total_chars {
            windows.push(&text[offsets[start]..]);
            break;
        }

        let proposal = &text[offsets[start]..offsets[tentative_end]];
        let end = match natural_break(proposal, max_chars, overlap_chars) {
            Some(len) => start + len,
            None => tentative_end,
        };

        windows.push(&text[offsets[start]..offsets[end]]);
        start = end - overlap_chars;
    }

    Ok(windows)
}

/// Length in chars of `window` up to and including the first acceptable
/// break separator.
fn natural_break(window: &str, max_chars: usize, overlap_chars: usize) -> Option<usize> {
    BREAK_RULES.iter().find_map(|rule| {
        let byte_pos = window.rfind(rule.separator)?;
        let pos = window[..byte_pos].chars().count();
        (pos > rule.min_position(max_chars, overlap_chars))
            .then(|| pos + rule.separator.chars().count())
    })
}
