//! HTML to plain text for the page fetch tool.
//!
//! Not a parser: script and style blocks are dropped, every other tag becomes
//! a space, and whitespace runs collapse to one space.

use regex::Regex;
use std::sync::LazyLock;

/// Marker appended when page text is cut short.
pub const TRUNCATION_MARKER: &str = "... [truncated]";

static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("valid pattern"));
static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("valid pattern"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid pattern"));

/// Extract readable text from an HTML document.
pub fn html_to_text(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = TAG.replace_all(&text, " ");
    collapse_whitespace(&text)
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cut `text` to `max_chars` characters, appending [`TRUNCATION_MARKER`] if
/// anything was removed.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{TRUNCATION_MARKER}", &text[..idx]),
        None => text.to_string(),
    }
}

/// First `max_chars` characters followed by `...`, used for progress previews.
pub fn preview(text: &str, max_chars: usize) -> String {
    let end = text
        .char_indices()
        .nth(max_chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    format!("{}...", &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_collapses_whitespace() {
        let html = "<html><body>\n  <h1>Title</h1>\n<p>Some   <b>bold</b> text.</p></body></html>";
        assert_eq!(html_to_text(html), "Title Some bold text.");
    }

    #[test]
    fn drops_script_and_style_blocks() {
        let html = r#"<head><STYLE type="text/css">body { color: red; }</STYLE>
<script>var x = "<p>not text</p>";</script></head><body>Visible</body>"#;
        assert_eq!(html_to_text(html), "Visible");
    }

    #[test]
    fn unclosed_script_is_treated_as_a_tag() {
        assert_eq!(html_to_text("<script>alert(1)"), "alert(1)");
    }

    #[test]
    fn open_bracket_runs_to_next_close() {
        assert_eq!(html_to_text("a < b and <> c"), "a c");
    }

    #[test]
    fn unmatched_angle_brackets_survive() {
        assert_eq!(html_to_text("a < b"), "a < b");
        assert_eq!(html_to_text("x <> y"), "x <> y");
    }

    #[test]
    fn multibyte_text_is_preserved() {
        assert_eq!(html_to_text("<p>Café — 18°C</p>"), "Café — 18°C");
    }

    #[test]
    fn truncate_appends_marker_only_when_needed() {
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello... [truncated]");
        assert_eq!(truncate_chars("ééééé", 2), "éé... [truncated]");
    }

    #[test]
    fn preview_always_ends_with_ellipsis() {
        assert_eq!(preview("short", 500), "short...");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
