//! Display text helpers for rendered trees
//!
//! Node text can be arbitrarily long and multi-line. Tree renderers need one
//! short line per node, so text is normalized to single spaces first and then
//! cut down to a title or a bounded preview.

use regex::Regex;
use std::sync::LazyLock;

/// Longest first sentence used verbatim as a title
pub const TITLE_SENTENCE_MAX: usize = 40;

/// Character budget for word-truncated titles (before the ellipsis)
pub const TITLE_WORDS_MAX: usize = 35;

/// Character budget for content previews
pub const PREVIEW_MAX: usize = 150;

const ELLIPSIS: &str = "...";

/// Compiled regex for whitespace normalization
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// End of the first sentence: terminator followed by whitespace or end of text
static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?](\s|$)").unwrap());

/// Collapse every whitespace run (newlines included) into a single space
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Short title for structure views
///
/// The first sentence when it fits in 40 characters, otherwise as many whole
/// words as fit in 35 characters followed by `...`.
///
/// # Examples
///
/// ```
/// # use notegraph_core::utils::text::title;
/// assert_eq!(title("Groceries. Milk, eggs and bread"), "Groceries.");
/// assert_eq!(
///     title("A rather long note about the quarterly planning offsite"),
///     "A rather long note about the..."
/// );
/// ```
pub fn title(text: &str) -> String {
    let text = normalize_whitespace(text);

    let sentence = match SENTENCE_END_RE.find(&text) {
        Some(end) => text[..end.start() + 1].to_string(),
        None => text.clone(),
    };
    if sentence.chars().count() <= TITLE_SENTENCE_MAX {
        return sentence;
    }

    let mut fitted = String::new();
    for word in text.split(' ') {
        let extra = if fitted.is_empty() { 0 } else { 1 };
        if fitted.chars().count() + extra + word.chars().count() > TITLE_WORDS_MAX {
            break;
        }
        if extra == 1 {
            fitted.push(' ');
        }
        fitted.push_str(word);
    }

    // A single huge word: cut it mid-word
    if fitted.is_empty() {
        fitted = text.chars().take(TITLE_WORDS_MAX).collect();
    }

    fitted.push_str(ELLIPSIS);
    fitted
}

/// At most `max` characters of normalized text, `...` appended when cut
pub fn preview(text: &str, max: usize) -> String {
    let text = normalize_whitespace(text);
    if text.chars().count() <= max {
        return text;
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str(ELLIPSIS);
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_first_sentence_is_kept() {
        assert_eq!(title("Buy milk! Then walk the dog."), "Buy milk!");
        assert_eq!(title("  Plain   note  "), "Plain note");
    }

    #[test]
    fn test_long_text_is_cut_on_word_boundary() {
        let result = title("This is a very long sentence that will certainly not fit into forty characters");
        assert!(result.ends_with("..."));
        assert!(result.chars().count() <= TITLE_WORDS_MAX + 3);
        assert_eq!(result, "This is a very long sentence that...");
    }

    #[test]
    fn test_multiline_text_is_flattened() {
        assert_eq!(title("Line one\nline two"), "Line one line two");
    }

    #[test]
    fn test_single_giant_word_is_cut() {
        let word = "x".repeat(60);
        let result = title(&word);
        assert_eq!(result, format!("{}...", "x".repeat(35)));
    }

    #[test]
    fn test_decimal_points_do_not_end_sentences() {
        assert_eq!(title("Version 2.5 released"), "Version 2.5 released");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let text = "é".repeat(200);
        let result = preview(&text, PREVIEW_MAX);
        assert_eq!(result.chars().count(), PREVIEW_MAX + 3);
        assert_eq!(preview("short", PREVIEW_MAX), "short");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(title(""), "");
        assert_eq!(preview("", 10), "");
    }
}
