//! Whitespace normalization for converted document text.
//!
//! Conversion output is noisy: long runs of blank lines between blocks and
//! padded table cells. Normalization collapses that noise so chunk lengths
//! reflect real content.

use std::sync::LazyLock;

use regex::Regex;

static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank line regex"));

static INLINE_SPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("valid inline space regex"));

/// Clean extracted text for chunking and indexing.
///
/// - 3 or more consecutive newlines become exactly two.
/// - Runs of spaces and tabs become a single space.
/// - Leading and trailing whitespace is trimmed.
///
/// Empty or whitespace-only input yields an empty string. The function is
/// idempotent: `normalize_text(&normalize_text(x)) == normalize_text(x)`.
pub fn normalize_text(text: &str) -> String {
    if text.trim().is_empty() {
        tracing::debug!(target: "normalize", "empty input, skipping");
        return String::new();
    }

    let collapsed = BLANK_LINE_RUN.replace_all(text, "\n\n");
    let collapsed = INLINE_SPACE_RUN.replace_all(&collapsed, " ");
    let out = collapsed.trim().to_string();

    tracing::debug!(
        target: "normalize",
        input_chars = text.chars().count(),
        output_chars = out.chars().count(),
        "whitespace normalized"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_and_blank_input() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("   \n\n \t "), "");
    }

    #[test]
    fn test_collapses_blank_lines() {
        assert_eq!(normalize_text("a\n\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\n\nb"), "a\n\nb");
        assert_eq!(normalize_text("a\nb"), "a\nb");
    }

    #[test]
    fn test_collapses_spaces_and_tabs() {
        assert_eq!(normalize_text("| a  |\t\tb   |"), "| a | b |");
    }

    #[test]
    fn test_trims_edges() {
        assert_eq!(normalize_text("\n\n  ## Title  \n\n"), "## Title");
    }

    #[test]
    fn test_keeps_other_whitespace() {
        assert_eq!(normalize_text("a\r\nb"), "a\r\nb");
    }

    proptest! {
        #[test]
        fn prop_idempotent(s in "[ a-z#.\t\n]{0,200}") {
            let once = normalize_text(&s);
            prop_assert_eq!(normalize_text(&once), once);
        }

        #[test]
        fn prop_no_long_runs(s in "[ a-z\t\n]{0,200}") {
            let out = normalize_text(&s);
            prop_assert!(!out.contains("\n\n\n"));
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.contains('\t'));
        }
    }
}
