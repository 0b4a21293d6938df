//! Error types for the MNI client.

use thiserror::Error;

/// Result type for MNI client operations.
pub type Result<T> = std::result::Result<T, MniError>;

/// MNI client errors.
#[derive(Debug, Error)]
pub enum MniError {
    /// Transport failure (connection, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response that carried no SOAP fault
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// SOAP fault returned by the service
    #[error("SOAP fault: {0}")]
    Fault(String),

    /// The service answered but refused the filing (`sucesso` = false)
    #[error("filing rejected: {message}")]
    Rejected { message: String },

    /// Response did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Reading the signed document failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MniError {
    /// Whether the request timed out before a response arrived.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}
