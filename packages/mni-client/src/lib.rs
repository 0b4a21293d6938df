//! Client for the MNI 2.2.2 court interoperability service.
//!
//! Covers the two operations a notice-driven filing needs: fetching the
//! content of a communication (`consultarTeorComunicacao`) and filing a
//! pre-signed document (`entregarManifestacaoProcessual`).
//!
//! # Example
//!
//! ```rust,ignore
//! use mni_client::{Credentials, CourtService, MniClient};
//!
//! let client = MniClient::new(Credentials::new("12345678900", "senha"));
//!
//! let raw = client.fetch_notice_content("0801234-56.2023.8.18.0140", "98765").await?;
//! let text = raw.extract()?;
//! ```

pub mod credentials;
pub mod envelope;
pub mod error;
pub mod service;
pub mod testing;
pub mod types;

pub use credentials::Credentials;
pub use error::{MniError, Result};
pub use service::CourtService;
pub use types::{FilingReceipt, RawResponse, SignedDocument, DEFAULT_DOCUMENT_TYPE};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

/// Intercomunicação endpoint of the first instance of TJPI.
pub const DEFAULT_ENDPOINT: &str = "https://pje.tjpi.jus.br/1g/intercomunicacao?wsdl";

/// Budget for a content query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(90);

/// Budget for a filing. Larger, since the request carries the document.
pub const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(180);

const SOAP_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

pub struct MniClient {
    client: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
    query_timeout: Duration,
    submit_timeout: Duration,
}

impl MniClient {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            credentials,
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            submit_timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    /// Use a shared HTTP client instead of a private one.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_submit_timeout(mut self, timeout: Duration) -> Self {
        self.submit_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST an envelope and return status plus body bytes.
    ///
    /// Non-2xx responses become [`MniError::Fault`] when the body is a SOAP
    /// fault and [`MniError::Api`] otherwise.
    async fn post_envelope(&self, request: String, timeout: Duration) -> Result<RawResponse> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .timeout(timeout)
            .body(request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.bytes().await?.to_vec();

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            if let Some(fault) = envelope::fault_string(&text) {
                return Err(MniError::Fault(fault));
            }
            return Err(MniError::Api {
                status: status.as_u16(),
                message: text.into_owned(),
            });
        }

        Ok(RawResponse::new(status.as_u16(), body))
    }
}

#[async_trait]
impl CourtService for MniClient {
    async fn fetch_notice_content(
        &self,
        case_number: &str,
        notice_id: &str,
    ) -> Result<RawResponse> {
        tracing::debug!(case_number, notice_id, "Querying notice content");

        let request = envelope::notice_content_request(&self.credentials, case_number, notice_id);
        let raw = self.post_envelope(request, self.query_timeout).await?;

        tracing::debug!(
            case_number,
            notice_id,
            status = raw.status,
            len = raw.body.len(),
            "Notice content received"
        );
        Ok(raw)
    }

    async fn submit_filing(
        &self,
        case_number: &str,
        document: &SignedDocument,
    ) -> Result<FilingReceipt> {
        tracing::info!(
            case_number,
            file_name = %document.file_name,
            size = document.content.len(),
            "Submitting filing"
        );

        let sent_at = chrono::Local::now().naive_local();
        let request = envelope::filing_request(&self.credentials, case_number, document, sent_at);
        let raw = self.post_envelope(request, self.submit_timeout).await?;

        let receipt = envelope::parse_filing_response(&raw.text())?;
        tracing::info!(
            case_number,
            protocol = receipt.protocol.as_deref().unwrap_or("-"),
            "Filing accepted"
        );
        Ok(receipt)
    }
}
