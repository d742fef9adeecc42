//! Grapheme-aware text helpers.
//!
//! Point content comes straight from a model and freely mixes emoji,
//! combining marks and CJK text, so every truncation goes through
//! grapheme clusters rather than bytes or chars.

use unicode_segmentation::UnicodeSegmentation;

/// Counts the number of grapheme clusters in a string.
///
/// # Examples
///
/// ```
/// use pointstream::io::unicode::grapheme_count;
///
/// assert_eq!(grapheme_count("Hello"), 5);
/// assert_eq!(grapheme_count("世界"), 2);
/// ```
#[must_use]
pub fn grapheme_count(s: &str) -> usize {
    s.graphemes(true).count()
}

/// Truncates a string to at most `max_graphemes` grapheme clusters.
#[must_use]
pub fn truncate_graphemes(s: &str, max_graphemes: usize) -> &str {
    let mut end_byte = 0;

    for (count, grapheme) in s.graphemes(true).enumerate() {
        if count >= max_graphemes {
            break;
        }
        end_byte += grapheme.len();
    }

    &s[..end_byte]
}

/// Shortens `s` to `max_graphemes` clusters, ending with `...` when cut.
///
/// # Examples
///
/// ```
/// use pointstream::io::unicode::ellipsize;
///
/// assert_eq!(ellipsize("short", 10), "short");
/// assert_eq!(ellipsize("a longer sentence", 8), "a lon...");
/// ```
#[must_use]
pub fn ellipsize(s: &str, max_graphemes: usize) -> String {
    if grapheme_count(s) <= max_graphemes {
        return s.to_string();
    }
    if max_graphemes <= 3 {
        return truncate_graphemes(s, max_graphemes).to_string();
    }
    format!("{}...", truncate_graphemes(s, max_graphemes - 3))
}
