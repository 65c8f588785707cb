//! Markdown-heading section splitter.
//!
//! Partitions normalized text into sections that start at level-2 or
//! level-3 headings (`## ` / `### `). Level-1 and level-4+ headings never
//! start a section; they stay inside the section that contains them.
//!
//! Heading *extraction* is wider than splitting: [`extract_heading`]
//! recognizes levels 1 through 6, so a document that opens with `# Title`
//! still tags its first section with that title.

use std::sync::LazyLock;

use regex::Regex;

/// Start of a line that opens a level-2 or level-3 heading.
static SECTION_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{2,3}\s").expect("valid section boundary regex"));

static LEADING_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+(.+)$").expect("valid heading regex"));

/// Split `text` immediately before every line that opens a `##` or `###`
/// heading.
///
/// Each section keeps its heading line as its first line. Sections are
/// trimmed and empty ones are dropped, so blank input yields an empty list
/// and heading-free input yields a single section.
pub fn split_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;

    for boundary in SECTION_BOUNDARY.find_iter(text) {
        // A heading on the very first line opens the first section; there
        // is nothing before it to cut off.
        if boundary.start() == 0 {
            continue;
        }
        push_section(&mut sections, &text[start..boundary.start()]);
        start = boundary.start();
    }
    push_section(&mut sections, &text[start..]);

    sections
}

fn push_section<'a>(sections: &mut Vec<&'a str>, raw: &'a str) {
    let trimmed = raw.trim();
    if !trimmed.is_empty() {
        sections.push(trimmed);
    }
}

/// Return the heading text of `section` if its first line is a markdown
/// heading of level 1 to 6 (`#`..`######` followed by whitespace and text).
///
/// Only the first line is examined. Markers and surrounding whitespace are
/// stripped from the result.
pub fn extract_heading(section: &str) -> Option<&str> {
    let first_line = section.split('\n').next().unwrap_or_default().trim();
    LEADING_HEADING
        .captures(first_line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_headings_single_section() {
        let text = "Plain paragraph.\n\nAnother paragraph.";
        assert_eq!(split_sections(text), vec![text]);
    }

    #[test]
    fn test_blank_input_no_sections() {
        assert!(split_sections("").is_empty());
        assert!(split_sections("  \n\n ").is_empty());
    }

    #[test]
    fn test_splits_on_level_two_and_three() {
        let text = "Preamble\n## Intro\nHello\n### Detail\nMore";
        assert_eq!(
            split_sections(text),
            vec!["Preamble", "## Intro\nHello", "### Detail\nMore"]
        );
    }

    #[test]
    fn test_level_one_and_four_do_not_split() {
        let text = "# Title\nbody\n#### Deep\nstill body\n##### Deeper";
        assert_eq!(split_sections(text), vec![text]);
    }

    #[test]
    fn test_leading_heading_keeps_first_section() {
        let text = "## Intro\nHello world.\n\n## Details\nMore.";
        assert_eq!(
            split_sections(text),
            vec!["## Intro\nHello world.", "## Details\nMore."]
        );
    }

    #[test]
    fn test_heading_without_space_is_not_boundary() {
        let text = "intro\n##hashtag not a heading";
        assert_eq!(split_sections(text), vec![text]);
    }

    #[test]
    fn test_empty_sections_dropped() {
        let text = "\n\n## A\nbody";
        assert_eq!(split_sections(text), vec!["## A\nbody"]);
    }

    #[test]
    fn test_heading_only_section_kept() {
        let text = "## A\n\n## B\nbody";
        assert_eq!(split_sections(text), vec!["## A", "## B\nbody"]);
    }

    #[test]
    fn test_extract_heading_levels() {
        assert_eq!(extract_heading("# Title\nbody"), Some("Title"));
        assert_eq!(extract_heading("## Intro"), Some("Intro"));
        assert_eq!(extract_heading("###### Six  \nx"), Some("Six"));
        assert_eq!(extract_heading("####### Seven"), None);
    }

    #[test]
    fn test_extract_heading_none() {
        assert_eq!(extract_heading("Just text\n## Later"), None);
        assert_eq!(extract_heading("##"), None);
        assert_eq!(extract_heading("#NoSpace"), None);
        assert_eq!(extract_heading(""), None);
    }
}
