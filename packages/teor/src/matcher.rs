//! Literal phrase matching over document markup.
//!
//! Matching is a contiguous substring test on normalized text. Word order
//! matters and no tokenization is done: the phrase identifies a specific
//! piece of boilerplate wording.

use lazy_static::lazy_static;
use regex::Regex;

use crate::entities::unescape;

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Reduce markup to comparable text.
///
/// Decodes entities, replaces every tag with a space, collapses whitespace
/// runs and lower-cases the result.
pub fn normalize_text(text: &str) -> String {
    let unescaped = unescape(text);
    let untagged = TAG_REGEX.replace_all(&unescaped, " ");
    let collapsed = WHITESPACE_REGEX.replace_all(&untagged, " ");
    collapsed.trim().to_lowercase()
}

fn normalize_phrase(phrase: &str) -> String {
    phrase.trim().to_lowercase()
}

/// Case-insensitive, markup-insensitive substring test.
///
/// Always false when either side is empty.
pub fn matches(document_text: &str, phrase: &str) -> bool {
    let phrase = normalize_phrase(phrase);
    if phrase.is_empty() || document_text.trim().is_empty() {
        return false;
    }
    normalize_text(document_text).contains(&phrase)
}

/// Normalized text around the first occurrence of `phrase`.
///
/// Takes up to `radius` characters on each side of the match. `None` when
/// [`matches`] would be false.
pub fn excerpt(document_text: &str, phrase: &str, radius: usize) -> Option<String> {
    let phrase = normalize_phrase(phrase);
    if phrase.is_empty() {
        return None;
    }

    let text = normalize_text(document_text);
    let start = text.find(&phrase)?;
    let end = start + phrase.len();

    let from = text[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map_or(start, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map_or(text.len(), |(i, _)| end + i);

    let mut out = String::new();
    if from > 0 {
        out.push_str("...");
    }
    out.push_str(&text[from..to]);
    if to < text.len() {
        out.push_str("...");
    }
    Some(out)
}
