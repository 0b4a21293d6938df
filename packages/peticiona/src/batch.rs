//! Sequential batch processing of notice rows.
//!
//! Each row is fully handled (fetch, extract, match, optionally file)
//! before the next one starts. A fixed pause between rows throttles calls
//! to the court. Stopping is checked between rows only; a call already in
//! flight always completes.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use mni_client::{CourtService, SignedDocument};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::spreadsheet::NoticeRow;

/// Characters of context kept on each side of a match for the report.
const EXCERPT_RADIUS: usize = 80;

/// What happened to one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowStatus {
    /// Phrase found and the document was filed
    Filed { protocol: Option<String> },
    /// Phrase found, nothing filed (dry run)
    Matched,
    /// Content obtained, phrase absent
    NoMatch,
    /// Response had no extractable content
    Unavailable,
    /// Query or filing failed
    Error { message: String },
}

impl RowStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn protocol(&self) -> Option<&str> {
        match self {
            Self::Filed { protocol } => protocol.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for RowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filed {
                protocol: Some(protocol),
            } => write!(f, "Manifestação enviada (protocolo {protocol})"),
            Self::Filed { protocol: None } => f.write_str("Manifestação enviada"),
            Self::Matched => f.write_str("Correspondência encontrada (simulação)"),
            Self::NoMatch => f.write_str("Sem correspondência"),
            Self::Unavailable => f.write_str("Não foi possível obter o teor"),
            Self::Error { message } => write!(f, "Erro: {message}"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RowOutcome {
    pub row: NoticeRow,
    pub status: RowStatus,
    /// Normalized text around the match, when there was one
    pub excerpt: Option<String>,
    pub processed_at: DateTime<Local>,
}

impl RowOutcome {
    fn new(row: &NoticeRow, status: RowStatus, excerpt: Option<String>) -> Self {
        Self {
            row: row.clone(),
            status,
            excerpt,
            processed_at: Local::now(),
        }
    }
}

pub struct BatchRunner<S> {
    service: S,
    phrase: String,
    document: SignedDocument,
    pause: Duration,
    dry_run: bool,
    cancel: CancellationToken,
}

impl<S: CourtService> BatchRunner<S> {
    pub fn new(service: S, phrase: impl Into<String>, document: SignedDocument) -> Self {
        Self {
            service,
            phrase: phrase.into(),
            document,
            pause: Duration::from_secs(1),
            dry_run: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Pause after each row (except the last).
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Check for the phrase without filing anything.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that stops the batch before the next row when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Process `rows` in order, reporting each outcome as it is produced.
    ///
    /// `on_progress` receives the 1-based position, the total and the
    /// outcome. A stopped batch returns the outcomes gathered so far.
    pub async fn run<F>(&self, rows: &[NoticeRow], mut on_progress: F) -> Vec<RowOutcome>
    where
        F: FnMut(usize, usize, &RowOutcome),
    {
        let total = rows.len();
        let mut outcomes = Vec::with_capacity(total);

        for (idx, row) in rows.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(processed = idx, total, "Batch stopped before completion");
                break;
            }

            let outcome = self.process_row(row).await;
            on_progress(idx + 1, total, &outcome);
            outcomes.push(outcome);

            if !self.pause.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(self.pause) => {}
                    _ = self.cancel.cancelled() => {}
                }
            }
        }

        outcomes
    }

    /// Fetch, extract, match and (unless dry run) file for a single row.
    pub async fn process_row(&self, row: &NoticeRow) -> RowOutcome {
        let raw = match self
            .service
            .fetch_notice_content(&row.case_number, &row.notice_id)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    line = row.line,
                    case_number = %row.case_number,
                    notice_id = %row.notice_id,
                    error = %e,
                    "Notice content query failed"
                );
                return RowOutcome::new(row, RowStatus::Error { message: e.to_string() }, None);
            }
        };

        let text = match raw.extract() {
            Ok(text) => text,
            Err(e) => {
                debug!(
                    line = row.line,
                    case_number = %row.case_number,
                    reason = ?e.kind(),
                    error = %e,
                    "No content obtained"
                );
                if let Some(payload) = e.raw_payload() {
                    debug!(line = row.line, payload = %preview(payload), "Non-multipart response");
                }
                return RowOutcome::new(row, RowStatus::Unavailable, None);
            }
        };

        if !teor::matches(&text, &self.phrase) {
            debug!(line = row.line, case_number = %row.case_number, "Phrase not found");
            return RowOutcome::new(row, RowStatus::NoMatch, None);
        }
        let excerpt = teor::excerpt(&text, &self.phrase, EXCERPT_RADIUS);

        if self.dry_run {
            info!(line = row.line, case_number = %row.case_number, "Phrase found (dry run)");
            return RowOutcome::new(row, RowStatus::Matched, excerpt);
        }

        let status = match self
            .service
            .submit_filing(&row.case_number, &self.document)
            .await
        {
            Ok(receipt) => RowStatus::Filed {
                protocol: receipt.protocol,
            },
            Err(e) => {
                warn!(
                    line = row.line,
                    case_number = %row.case_number,
                    error = %e,
                    "Filing failed"
                );
                RowStatus::Error { message: e.to_string() }
            }
        };

        RowOutcome::new(row, status, excerpt)
    }
}

/// First characters of a payload, for logs.
fn preview(payload: &str) -> String {
    const LIMIT: usize = 200;
    match payload.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &payload[..idx]),
        None => payload.to_string(),
    }
}
