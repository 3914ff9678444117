//! Word-boundary helpers
//!
//! A word boundary is any position not flanked by a Unicode letter or number,
//! so `"conf"` is never found inside `"overconfident"`. Rust's regex engine has
//! no look-around, so boundaries are checked on the haystack around each
//! candidate instead.

use std::ops::Range;

/// Letters and numbers form words
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// True if the character before `index` is not a word character
pub fn is_boundary_before(text: &str, index: usize) -> bool {
    text[..index].chars().next_back().map_or(true, |c| !is_word_char(c))
}

/// True if the character at `index` is not a word character
pub fn is_boundary_after(text: &str, index: usize) -> bool {
    text[index..].chars().next().map_or(true, |c| !is_word_char(c))
}

/// Byte index of the character following the one at `index`
pub fn next_char_index(text: &str, index: usize) -> usize {
    text[index..].chars().next().map_or(text.len() + 1, |c| index + c.len_utf8())
}

/// All non-overlapping word-bounded occurrences of `needle`, left to right
pub fn find_all_word_bounded(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    let mut found = Vec::new();
    if needle.is_empty() {
        return found;
    }

    let mut from = 0;
    while from <= haystack.len() {
        let Some(offset) = haystack[from..].find(needle) else {
            break;
        };
        let start = from + offset;
        let end = start + needle.len();
        if is_boundary_before(haystack, start) && is_boundary_after(haystack, end) {
            found.push(start..end);
            from = end;
        } else {
            from = next_char_index(haystack, start);
        }
    }
    found
}

/// First word-bounded occurrence of `needle`
pub fn find_word_bounded(haystack: &str, needle: &str) -> Option<Range<usize>> {
    find_all_word_bounded(haystack, needle).into_iter().next()
}

/// `needle` occurs in `haystack` at word boundaries. Identical texts are
/// not containment.
pub fn contains_word_bounded(haystack: &str, needle: &str) -> bool {
    needle.len() < haystack.len() && find_word_bounded(haystack, needle).is_some()
}

/// Anchor slug of a term: lowercased, whitespace runs become `-`
pub fn slug(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
