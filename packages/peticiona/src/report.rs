//! Excel report of a batch run.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

use crate::batch::{RowOutcome, RowStatus};

const SHEET_NAME: &str = "Resultado";

const HEADERS: &[(&str, f64)] = &[
    ("Linha", 8.0),
    ("Processo", 28.0),
    ("Expediente", 14.0),
    ("Status", 40.0),
    ("Protocolo", 20.0),
    ("Trecho", 80.0),
    ("Data/Hora", 20.0),
];

/// Write one line per outcome to a new workbook at `path`.
pub fn write_report(path: &Path, outcomes: &[RowOutcome]) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, (title, width)) in HEADERS.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &bold)?;
        sheet.set_column_width(col, *width)?;
    }

    for (idx, outcome) in outcomes.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_number(row, 0, outcome.row.line)?;
        sheet.write_string(row, 1, &outcome.row.case_number)?;
        sheet.write_string(row, 2, &outcome.row.notice_id)?;
        sheet.write_string(row, 3, outcome.status.to_string())?;
        sheet.write_string(row, 4, outcome.status.protocol().unwrap_or_default())?;
        sheet.write_string(row, 5, outcome.excerpt.as_deref().unwrap_or_default())?;
        sheet.write_string(
            row,
            6,
            outcome.processed_at.format("%d/%m/%Y %H:%M:%S").to_string(),
        )?;
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    tracing::info!(path = %path.display(), rows = outcomes.len(), "Report written");
    Ok(())
}

/// Counts per status for the end-of-run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub processed: usize,
    pub filed: usize,
    pub matched: usize,
    pub no_match: usize,
    pub unavailable: usize,
    pub errors: usize,
    /// Error messages and how often each occurred
    pub error_messages: BTreeMap<String, usize>,
}

impl Summary {
    /// `total` is the number of rows queued, which exceeds the outcome
    /// count when the batch was stopped early.
    pub fn from_outcomes(outcomes: &[RowOutcome], total: usize) -> Self {
        let mut summary = Self {
            total,
            processed: outcomes.len(),
            ..Self::default()
        };

        for outcome in outcomes {
            match &outcome.status {
                RowStatus::Filed { .. } => summary.filed += 1,
                RowStatus::Matched => summary.matched += 1,
                RowStatus::NoMatch => summary.no_match += 1,
                RowStatus::Unavailable => summary.unavailable += 1,
                RowStatus::Error { message } => {
                    summary.errors += 1;
                    *summary.error_messages.entry(message.clone()).or_default() += 1;
                }
            }
        }

        summary
    }

    pub fn stopped_early(&self) -> bool {
        self.processed < self.total
    }
}
