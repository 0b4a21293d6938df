//! Caller identity for the court service.
//!
//! The password is held in a `secrecy::SecretString` so it never ends up in
//! logs, debug output or error messages. It is only exposed while building a
//! request envelope.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// Caller identity sent with every request.
///
/// The same pair is used as `idConsultante`/`senhaConsultante` on queries
/// and `idManifestante`/`senhaManifestante` on filings.
#[derive(Clone)]
pub struct Credentials {
    cpf: String,
    password: SecretString,
}

impl Credentials {
    /// The CPF may be given with punctuation (`123.456.789-00`); the service
    /// only accepts the digits.
    pub fn new(cpf: &str, password: impl Into<String>) -> Self {
        Self {
            cpf: cpf.chars().filter(|c| c.is_ascii_digit()).collect(),
            password: SecretString::from(password.into()),
        }
    }

    /// CPF of the lawyer, digits only.
    pub fn id(&self) -> &str {
        &self.cpf
    }

    /// A CPF always has eleven digits.
    pub fn has_valid_cpf(&self) -> bool {
        self.cpf.len() == 11
    }

    pub(crate) fn expose_password(&self) -> &str {
        self.password.expose_secret()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("cpf", &self.cpf)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
