//! Typed errors for content extraction.
//!
//! Every way an extraction can fail is a structural outcome of parsing a
//! response that was already received. None of them are retried.

use thiserror::Error;

/// Why an extraction produced no document text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No `--uuid:` boundary, so the body is not an MTOM envelope.
    ///
    /// The raw body is kept so callers can inspect it (some endpoints
    /// answer with plain markup or a bare SOAP fault).
    #[error("response is not multipart")]
    NotMultipart { raw: String },

    /// The envelope has no `<xop:Include href="cid:...">` reference
    #[error("no xop:Include reference found in response")]
    ReferenceNotFound,

    /// The referenced attachment part is missing from the envelope
    #[error("attachment with Content-ID <{cid}> not found")]
    ContentIdNotFound { cid: String },

    /// Attachment body was neither markup nor valid base64
    #[error("failed to decode attachment: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Closed set of failure reasons, without payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NotMultipart,
    ReferenceNotFound,
    ContentIdNotFound,
    DecodeError,
}

impl ExtractError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotMultipart { .. } => FailureKind::NotMultipart,
            Self::ReferenceNotFound => FailureKind::ReferenceNotFound,
            Self::ContentIdNotFound { .. } => FailureKind::ContentIdNotFound,
            Self::Decode(_) => FailureKind::DecodeError,
        }
    }

    /// The untouched response body, only present for non-multipart responses.
    pub fn raw_payload(&self) -> Option<&str> {
        match self {
            Self::NotMultipart { raw } => Some(raw),
            _ => None,
        }
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;
