//! HTML character reference decoding, HTML5 parsing rules.
//!
//! Named references are looked up in `html_escape`'s HTML5 table. On top of
//! that, court documents produced by older editors rely on two legacy
//! behaviors that a strict decoder rejects:
//!
//! - the 106 legacy names (`&amp`, `&ccedil`, ...) are valid without the
//!   trailing `;`, also as a prefix of a longer run (`&ampx` is `&x`);
//! - numeric references in `&#128;`..`&#159;` name Windows-1252 characters,
//!   so `&#128;` is `€` and not the C1 control U+0080.

use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref CHARREF_REGEX: Regex =
        Regex::new(r"&(#[0-9]+;?|#[xX][0-9a-fA-F]+;?|[^\t\n\x0C <&#;]{1,32};?)")
            .expect("valid regex");
}

/// Names the HTML5 spec accepts without a terminating semicolon.
const LEGACY_NAMES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren", "deg",
    "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34", "gt",
    "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

/// Windows-1252 meaning of `&#128;`..`&#159;`. Unassigned slots keep the
/// control character.
const WINDOWS_1252_C1: [char; 32] = [
    '\u{20AC}', '\u{81}', '\u{201A}', '\u{192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{2C6}', '\u{2030}', '\u{160}', '\u{2039}', '\u{152}', '\u{8D}', '\u{17D}', '\u{8F}',
    '\u{90}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{2DC}', '\u{2122}', '\u{161}', '\u{203A}', '\u{153}', '\u{9D}', '\u{17E}', '\u{178}',
];

/// Decode every character reference in `text`.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    CHARREF_REGEX.replace_all(text, |caps: &Captures| decode_reference(&caps[1]))
}

fn decode_reference(reference: &str) -> String {
    match reference.strip_prefix('#') {
        Some(number) => decode_numeric(number),
        None => decode_named(reference),
    }
}

fn decode_numeric(number: &str) -> String {
    let digits = number.trim_end_matches(';');
    let parsed = match digits.strip_prefix(|c| c == 'x' || c == 'X') {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => digits.parse::<u32>(),
    };
    // Overflow is out of range like any other huge value
    let code = parsed.unwrap_or(u32::MAX);

    match code {
        0x00 => '\u{FFFD}'.to_string(),
        0x0D => "\r".to_string(),
        0x80..=0x9F => WINDOWS_1252_C1[(code - 0x80) as usize].to_string(),
        0xD800..=0xDFFF => '\u{FFFD}'.to_string(),
        code if code > 0x10FFFF => '\u{FFFD}'.to_string(),
        0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F | 0xFDD0..=0xFDEF => String::new(),
        code if code & 0xFFFE == 0xFFFE => String::new(),
        code => char::from_u32(code).map(String::from).unwrap_or_default(),
    }
}

fn decode_named(reference: &str) -> String {
    if reference.ends_with(';') {
        if let Some(decoded) = lookup(reference.trim_end_matches(';')) {
            return decoded;
        }
    } else if LEGACY_NAMES.contains(&reference) {
        if let Some(decoded) = lookup(reference) {
            return decoded;
        }
    }

    // Longest legacy name that prefixes the run, rest kept verbatim
    for end in (2..reference.len()).rev() {
        if !reference.is_char_boundary(end) {
            continue;
        }
        let (name, rest) = reference.split_at(end);
        if LEGACY_NAMES.contains(&name) {
            if let Some(decoded) = lookup(name) {
                return decoded + rest;
            }
        }
    }

    format!("&{reference}")
}

/// Resolve `name` against the HTML5 named reference table.
///
/// A full match expands to at most two code points; anything longer means
/// the table only matched a prefix.
fn lookup(name: &str) -> Option<String> {
    let reference = format!("&{name};");
    let decoded = html_escape::decode_html_entities(&reference);
    if decoded != reference.as_str() && decoded.chars().count() <= 2 {
        Some(decoded.into_owned())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminated_references() {
        assert_eq!(unescape("Autor &amp; R&eacute;u"), "Autor & Réu");
        assert_eq!(unescape("&#231;&#xE7;&ccedil;"), "ççç");
        assert_eq!(unescape("&rarr;"), "\u{2192}");
    }

    #[test]
    fn test_legacy_names_without_semicolon() {
        assert_eq!(unescape("<p>a &amp b</p>"), "<p>a & b</p>");
        assert_eq!(unescape("&#231;&#xE7;&ccedil"), "ççç");
        assert_eq!(unescape("Apela&ccedil&atildeo"), "Apelação");
    }

    #[test]
    fn test_legacy_name_as_prefix() {
        assert_eq!(unescape("&ampx"), "&x");
        assert_eq!(unescape("&notit;"), "¬it;");
    }

    #[test]
    fn test_non_legacy_name_needs_semicolon() {
        assert_eq!(unescape("&rarr"), "&rarr");
        assert_eq!(unescape("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_windows_1252_numeric_range() {
        assert_eq!(unescape("&#128;"), "€");
        assert_eq!(unescape("&#x93;aspas&#x94;"), "\u{201C}aspas\u{201D}");
        assert_eq!(unescape("&#150;"), "\u{2013}");
    }

    #[test]
    fn test_invalid_code_points() {
        assert_eq!(unescape("&#0;"), "\u{FFFD}");
        assert_eq!(unescape("&#xD800;"), "\u{FFFD}");
        assert_eq!(unescape("&#99999999999;"), "\u{FFFD}");
        assert_eq!(unescape("a&#1;b"), "ab");
    }

    #[test]
    fn test_numeric_without_semicolon() {
        assert_eq!(unescape("&#231o"), "ço");
    }

    #[test]
    fn test_text_without_references_is_borrowed() {
        assert!(matches!(unescape("sem entidades"), Cow::Borrowed(_)));
        assert_eq!(unescape("a & b"), "a & b");
    }
}
