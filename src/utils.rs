//! Small string helpers used by logging, extraction and rendering.
//!
//! All truncation here counts `char`s, not bytes: article text is mostly
//! Hangul, where byte slicing would split code points.

use once_cell::sync::Lazy;
use regex::Regex;

/// Number of characters shown in an article's text preview.
pub const PREVIEW_CHARS: usize = 400;

/// Marker appended to a truncated preview.
pub const ELLIPSIS: char = '…';

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Cut article text down to a preview.
///
/// Text of at most [`PREVIEW_CHARS`] characters is returned unchanged;
/// longer text keeps its first [`PREVIEW_CHARS`] characters followed by a
/// single [`ELLIPSIS`]. Applying it to its own output is a no-op.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(preview("short"), "short");
/// assert_eq!(preview(&"가".repeat(401)).chars().count(), 401);
/// ```
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        None => text.to_string(),
        Some((cut, _)) => {
            let mut out = String::with_capacity(cut + ELLIPSIS.len_utf8());
            out.push_str(&text[..cut]);
            out.push(ELLIPSIS);
            out
        }
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings keep `max` characters and get `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview(""), "");
        assert_eq!(preview("짧은 본문"), "짧은 본문");
        let exact = "a".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);
    }

    #[test]
    fn test_preview_long_text_truncated() {
        let text = "가".repeat(PREVIEW_CHARS + 50);
        let p = preview(&text);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 1);
        assert!(p.ends_with(ELLIPSIS));
        assert!(p.starts_with(&"가".repeat(PREVIEW_CHARS)));
    }

    #[test]
    fn test_preview_is_idempotent() {
        for len in [0, 1, 399, 400, 401, 402, 1000] {
            let text = "뉴".repeat(len);
            let once = preview(&text);
            assert_eq!(preview(&once), once, "len {len}");
        }
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_multibyte() {
        let s = "한".repeat(10);
        let result = truncate_for_log(&s, 4);
        assert!(result.starts_with(&"한".repeat(4)));
        assert!(result.ends_with("…(+18 bytes)"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
        assert_eq!(collapse_whitespace("\n\n"), "");
    }
}
