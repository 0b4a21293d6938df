//! Court communication content extraction.
//!
//! Two pieces, the second usually fed by the first:
//!
//! - [`multipart`] pulls the document out of an MTOM multipart response
//!   (literal markup or base64) and decodes HTML entities.
//! - [`matcher`] tests whether a phrase occurs in that document once markup,
//!   case and whitespace differences are removed.
//!
//! # Usage
//!
//! ```rust,ignore
//! use teor::{extract, matches};
//!
//! let text = extract(&raw_body)?;
//! if matches(&text, "apresentar contrarrazões") {
//!     // file the pre-signed document
//! }
//! ```

pub mod entities;
pub mod error;
pub mod matcher;
pub mod multipart;

pub use entities::unescape;
pub use error::{ExtractError, FailureKind, Result};
pub use matcher::{excerpt, matches, normalize_text};
pub use multipart::{extract, extract_bytes};
