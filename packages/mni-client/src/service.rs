//! Court service abstraction.
//!
//! The batch runner only needs these two calls; tests swap in
//! [`MockCourtService`](crate::testing::MockCourtService).

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{FilingReceipt, RawResponse, SignedDocument};

#[async_trait]
pub trait CourtService: Send + Sync {
    /// Fetch the raw content response for one notice of one case.
    async fn fetch_notice_content(&self, case_number: &str, notice_id: &str)
        -> Result<RawResponse>;

    /// File a pre-signed document in a case.
    async fn submit_filing(
        &self,
        case_number: &str,
        document: &SignedDocument,
    ) -> Result<FilingReceipt>;
}
