//! Testing utilities including a mock court service.
//!
//! Useful for exercising batch logic without talking to a real court
//! endpoint.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{MniError, Result};
use crate::service::CourtService;
use crate::types::{FilingReceipt, RawResponse, SignedDocument};

/// Boundary used by [`multipart_response`].
pub const TEST_BOUNDARY: &str = "--uuid:3f2b8c1d-7a4e-4f60-9b1c-2d3e4f5a6b7c";

/// Build a synthetic MTOM response whose attachment `cid` holds `body`.
pub fn multipart_response(cid: &str, body: &str) -> String {
    format!(
        "{b}\r\nContent-Type: application/xop+xml; charset=UTF-8\r\n\r\n\
         <soap:Envelope><soap:Body><ns2:consultarTeorComunicacaoResposta>\
         <sucesso>true</sucesso><teor>\
         <xop:Include xmlns:xop=\"http://www.w3.org/2004/08/xop/include\" href=\"cid:{cid}\"/>\
         </teor></ns2:consultarTeorComunicacaoResposta></soap:Body></soap:Envelope>\r\n\
         {b}\r\nContent-Type: application/octet-stream\r\nContent-ID: <{cid}>\r\n\r\n\
         {body}\r\n{b}--",
        b = TEST_BOUNDARY,
    )
}

/// Canned answer for a content query.
#[derive(Debug, Clone)]
enum CannedNotice {
    Body(Vec<u8>),
    TransportError(String),
}

/// How the mock answers filings.
#[derive(Debug, Clone)]
enum CannedFiling {
    Accept,
    Reject(String),
}

/// Record of a call made to the mock service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    FetchNoticeContent {
        case_number: String,
        notice_id: String,
    },
    SubmitFiling {
        case_number: String,
        file_name: String,
    },
}

/// Mock court service for testing.
///
/// Notices without a canned answer fail with a 404 [`MniError::Api`].
/// Filings are accepted with protocol `PROT-<n>` unless configured
/// otherwise.
///
/// # Example
///
/// ```rust
/// use mni_client::testing::{multipart_response, MockCourtService};
///
/// let mock = MockCourtService::new()
///     .with_notice("0801234-56.2023.8.18.0140", "1", multipart_response("x", "<p>Agravo</p>"));
/// ```
pub struct MockCourtService {
    notices: Arc<RwLock<HashMap<(String, String), CannedNotice>>>,
    filing: Arc<RwLock<CannedFiling>>,
    calls: Arc<RwLock<Vec<MockCall>>>,
}

impl Default for MockCourtService {
    fn default() -> Self {
        Self {
            notices: Arc::new(RwLock::new(HashMap::new())),
            filing: Arc::new(RwLock::new(CannedFiling::Accept)),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }
}

impl Clone for MockCourtService {
    fn clone(&self) -> Self {
        Self {
            notices: Arc::clone(&self.notices),
            filing: Arc::clone(&self.filing),
            calls: Arc::clone(&self.calls),
        }
    }
}

impl MockCourtService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the query for (`case_number`, `notice_id`) with `body`.
    pub fn add_notice(&self, case_number: &str, notice_id: &str, body: impl Into<Vec<u8>>) {
        self.notices.write().unwrap().insert(
            (case_number.to_string(), notice_id.to_string()),
            CannedNotice::Body(body.into()),
        );
    }

    pub fn with_notice(self, case_number: &str, notice_id: &str, body: impl Into<Vec<u8>>) -> Self {
        self.add_notice(case_number, notice_id, body);
        self
    }

    /// Make the query for (`case_number`, `notice_id`) fail before any response.
    pub fn with_fetch_error(self, case_number: &str, notice_id: &str, message: &str) -> Self {
        self.notices.write().unwrap().insert(
            (case_number.to_string(), notice_id.to_string()),
            CannedNotice::TransportError(message.to_string()),
        );
        self
    }

    /// Reject every filing with `message`.
    pub fn with_filing_rejected(self, message: &str) -> Self {
        *self.filing.write().unwrap() = CannedFiling::Reject(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    /// Case numbers that received a filing, in call order.
    pub fn filed_cases(&self) -> Vec<String> {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter_map(|call| match call {
                MockCall::SubmitFiling { case_number, .. } => Some(case_number.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn fetch_call_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, MockCall::FetchNoticeContent { .. }))
            .count()
    }
}

#[async_trait]
impl CourtService for MockCourtService {
    async fn fetch_notice_content(
        &self,
        case_number: &str,
        notice_id: &str,
    ) -> Result<RawResponse> {
        self.calls.write().unwrap().push(MockCall::FetchNoticeContent {
            case_number: case_number.to_string(),
            notice_id: notice_id.to_string(),
        });

        let canned = self
            .notices
            .read()
            .unwrap()
            .get(&(case_number.to_string(), notice_id.to_string()))
            .cloned();

        match canned {
            Some(CannedNotice::Body(body)) => Ok(RawResponse::new(200, body)),
            Some(CannedNotice::TransportError(message)) => Err(MniError::Api {
                status: 503,
                message,
            }),
            None => Err(MniError::Api {
                status: 404,
                message: format!("no canned response for {case_number}/{notice_id}"),
            }),
        }
    }

    async fn submit_filing(
        &self,
        case_number: &str,
        document: &SignedDocument,
    ) -> Result<FilingReceipt> {
        let count = {
            let mut calls = self.calls.write().unwrap();
            calls.push(MockCall::SubmitFiling {
                case_number: case_number.to_string(),
                file_name: document.file_name.clone(),
            });
            calls
                .iter()
                .filter(|call| matches!(call, MockCall::SubmitFiling { .. }))
                .count()
        };

        match self.filing.read().unwrap().clone() {
            CannedFiling::Accept => Ok(FilingReceipt {
                protocol: Some(format!("PROT-{count}")),
                message: "Documento recebido".to_string(),
                received_at: None,
            }),
            CannedFiling::Reject(message) => Err(MniError::Rejected { message }),
        }
    }
}
