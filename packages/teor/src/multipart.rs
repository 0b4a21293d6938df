//! Attachment extraction from MTOM (XOP) multipart responses.
//!
//! The service wraps document content in a multipart SOAP response:
//!
//! ```text
//! --uuid:8f1c...e2
//! Content-Type: application/xop+xml
//!
//! <soap:Envelope>...<xop:Include href="cid:abc@example"/>...</soap:Envelope>
//! --uuid:8f1c...e2
//! Content-ID: <abc@example>
//! Content-Transfer-Encoding: binary
//!
//! PGh0bWw+...
//! --uuid:8f1c...e2--
//! ```
//!
//! The attachment body is either literal markup or base64. Both forms are
//! handled without knowing in advance which one a response uses.

use std::borrow::Cow;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::entities::unescape;
use crate::error::{ExtractError, Result};

lazy_static! {
    static ref BOUNDARY_REGEX: Regex =
        Regex::new(r"--uuid:[a-f0-9\-]{36}").expect("valid regex");

    static ref XOP_INCLUDE_REGEX: Regex =
        Regex::new(r#"<xop:Include[^>]*href="cid:([^"]+)""#).expect("valid regex");
}

/// Token that starts every part boundary, including the closing one.
const BOUNDARY_TOKEN: &str = "--uuid";

/// Separator between part sub-headers and part content.
const HEADER_SEPARATOR: &str = "\r\n\r\n";

/// Standard alphabet, padding optional.
const ATTACHMENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Extract the referenced attachment's text from a raw response body.
///
/// Returns the attachment content with HTML entities decoded. Anything
/// short of a fully decoded document is reported as an [`ExtractError`].
pub fn extract(raw: &str) -> Result<String> {
    if !BOUNDARY_REGEX.is_match(raw) {
        debug!(len = raw.len(), "Response has no uuid boundary");
        return Err(ExtractError::NotMultipart {
            raw: raw.to_string(),
        });
    }

    let cid = XOP_INCLUDE_REGEX
        .captures(raw)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .ok_or(ExtractError::ReferenceNotFound)?;

    let header_end = find_content_id(raw, cid).ok_or_else(|| ExtractError::ContentIdNotFound {
        cid: cid.to_string(),
    })?;

    let rest = &raw[header_end..];
    let segment = match rest.find(BOUNDARY_TOKEN) {
        Some(next) => &rest[..next],
        None => rest,
    };

    let body = match segment.split_once(HEADER_SEPARATOR) {
        Some((_headers, body)) => body.trim(),
        None => segment.trim(),
    };

    let text = decode_body(body)?;
    debug!(cid, len = text.len(), "Attachment extracted");

    Ok(unescape(&text).into_owned())
}

/// Same as [`extract`], for a body that has not been decoded to text yet.
///
/// Invalid UTF-8 in the transport is replaced rather than rejected; the
/// parts this module cares about are ASCII.
pub fn extract_bytes(raw: &[u8]) -> Result<String> {
    extract(&String::from_utf8_lossy(raw))
}

/// Byte offset just past the `Content-ID: <cid>` header, if present.
fn find_content_id(raw: &str, cid: &str) -> Option<usize> {
    let pattern = format!(r"(?i)Content-ID:\s*<{}>", regex::escape(cid));
    let re = Regex::new(&pattern).ok()?;
    re.find(raw).map(|m| m.end())
}

fn decode_body(body: &str) -> Result<Cow<'_, str>> {
    if body.starts_with('<') {
        return Ok(Cow::Borrowed(body));
    }

    // Anything outside the alphabet (line breaks, stray markers) is dropped
    let compact: String = body.chars().filter(|&c| is_base64_char(c)).collect();
    let bytes = ATTACHMENT_BASE64.decode(compact.as_bytes())?;

    match String::from_utf8(bytes) {
        Ok(text) => Ok(Cow::Owned(text)),
        Err(err) => {
            debug!(error = %err, "Attachment is not UTF-8, falling back to Latin-1");
            Ok(Cow::Owned(latin1(err.as_bytes())))
        }
    }
}

fn is_base64_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=')
}

/// Latin-1 maps every byte to the code point of the same value.
fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
