//! Input spreadsheet reading.
//!
//! Each data row names one notice: the case number and the notice
//! (expediente) identifier. Columns are found by header name when the first
//! row has recognizable headers, otherwise columns A and B are used.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use serde::Serialize;
use tracing::warn;

const CASE_HEADERS: &[&str] = &[
    "processo",
    "numero_processo",
    "numero_do_processo",
    "n_processo",
    "no_processo",
    "num_processo",
];

const NOTICE_HEADERS: &[&str] = &[
    "expediente",
    "id_expediente",
    "identificador_aviso",
    "aviso",
    "id_aviso",
    "no_expediente",
    "n_expediente",
    "num_expediente",
    "numero_expediente",
    "numero_do_expediente",
];

/// One notice to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeRow {
    /// 1-based line in the spreadsheet, for the report
    pub line: u32,
    pub case_number: String,
    pub notice_id: String,
}

impl NoticeRow {
    pub fn new(line: u32, case_number: impl Into<String>, notice_id: impl Into<String>) -> Self {
        Self {
            line,
            case_number: case_number.into(),
            notice_id: notice_id.into(),
        }
    }
}

/// Read the notice rows from the first worksheet of `path`.
pub fn read_rows(path: &Path) -> Result<Vec<NoticeRow>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open spreadsheet {}", path.display()))?;

    let range = workbook
        .worksheet_range_at(0)
        .context("Spreadsheet has no worksheets")?
        .context("Failed to read first worksheet")?;

    Ok(rows_from_range(&range))
}

/// Turn a worksheet range into notice rows, skipping incomplete lines.
pub fn rows_from_range(range: &Range<Data>) -> Vec<NoticeRow> {
    let first_line = range.start().map_or(1, |(row, _)| row + 1);

    let Some(first) = range.rows().next() else {
        return Vec::new();
    };

    let (case_col, notice_col) = header_columns(first);
    // A header row is never data, even when only one column was recognized
    let skip = usize::from(case_col.is_some() || notice_col.is_some());
    let (case_col, notice_col) = match (case_col, notice_col) {
        (Some(case_col), Some(notice_col)) => (case_col, notice_col),
        (Some(case_col), None) => (case_col, if case_col == 1 { 0 } else { 1 }),
        (None, Some(notice_col)) => (if notice_col == 0 { 1 } else { 0 }, notice_col),
        (None, None) => (0, 1),
    };

    let mut out = Vec::new();
    for (offset, cells) in range.rows().enumerate().skip(skip) {
        let line = first_line + offset as u32;
        let case_number = cells.get(case_col).map(cell_text).unwrap_or_default();
        let notice_id = cells.get(notice_col).map(cell_text).unwrap_or_default();

        if case_number.is_empty() && notice_id.is_empty() {
            continue;
        }
        if case_number.is_empty() || notice_id.is_empty() {
            warn!(line, %case_number, %notice_id, "Skipping incomplete row");
            continue;
        }

        out.push(NoticeRow::new(line, case_number, notice_id));
    }
    out
}

/// Column indexes of the case and notice headers found in `cells`.
fn header_columns(cells: &[Data]) -> (Option<usize>, Option<usize>) {
    let names: Vec<String> = cells.iter().map(|c| normalize_header(&cell_text(c))).collect();
    let case_col = names.iter().position(|n| CASE_HEADERS.contains(&n.as_str()));
    let notice_col = names.iter().position(|n| NOTICE_HEADERS.contains(&n.as_str()));
    (case_col, notice_col)
}

/// "Número do Processo" -> "numero_do_processo"
fn normalize_header(header: &str) -> String {
    let folded: String = header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' | 'º' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            c if c.is_alphanumeric() => c,
            _ => '_',
        })
        .collect();

    folded
        .split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Cell contents as trimmed text. Whole floats lose their `.0`, since
/// numeric notice ids are often stored as numbers.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_of(rows: &[&[Data]]) -> Range<Data> {
        let height = rows.len() as u32;
        let width = rows.iter().map(|r| r.len()).max().unwrap_or(1) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, cells) in rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    #[test]
    fn test_header_row_with_reordered_columns() {
        let range = range_of(&[
            &[s("Expediente"), s("Observação"), s("Número do Processo")],
            &[s("98765"), s("x"), s("0801234-56.2023.8.18.0140")],
            &[Data::Float(12345.0), Data::Empty, s(" 0800001-00.2024.8.18.0001 ")],
        ]);

        assert_eq!(
            rows_from_range(&range),
            vec![
                NoticeRow::new(2, "0801234-56.2023.8.18.0140", "98765"),
                NoticeRow::new(3, "0800001-00.2024.8.18.0001", "12345"),
            ]
        );
    }

    #[test]
    fn test_without_headers_uses_first_two_columns() {
        let range = range_of(&[
            &[s("0801234-56.2023.8.18.0140"), Data::Int(98765)],
            &[s("0800001-00.2024.8.18.0001"), s("111")],
        ]);

        let rows = rows_from_range(&range);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], NoticeRow::new(1, "0801234-56.2023.8.18.0140", "98765"));
        assert_eq!(rows[1].line, 2);
    }

    #[test]
    fn test_partly_recognized_header_is_not_data() {
        let range = range_of(&[
            &[s("Processo"), s("Código do Aviso")],
            &[s("0801234-56.2023.8.18.0140"), s("98765")],
        ]);

        assert_eq!(
            rows_from_range(&range),
            vec![NoticeRow::new(2, "0801234-56.2023.8.18.0140", "98765")]
        );
    }

    #[test]
    fn test_single_header_in_column_b() {
        let range = range_of(&[
            &[s("Aviso n."), s("Processo")],
            &[s("98765"), s("0801234-56.2023.8.18.0140")],
        ]);

        assert_eq!(
            rows_from_range(&range),
            vec![NoticeRow::new(2, "0801234-56.2023.8.18.0140", "98765")]
        );
    }

    #[test]
    fn test_numbered_notice_header() {
        let range = range_of(&[
            &[s("Nº Expediente"), s("Processo")],
            &[s("98765"), s("0801234-56.2023.8.18.0140")],
        ]);

        assert_eq!(
            rows_from_range(&range),
            vec![NoticeRow::new(2, "0801234-56.2023.8.18.0140", "98765")]
        );
    }

    #[test]
    fn test_incomplete_and_blank_rows_are_skipped() {
        let range = range_of(&[
            &[s("processo"), s("expediente")],
            &[s("0801234-56.2023.8.18.0140"), Data::Empty],
            &[Data::Empty, Data::Empty],
            &[s("0800001-00.2024.8.18.0001"), s("7")],
        ]);

        assert_eq!(
            rows_from_range(&range),
            vec![NoticeRow::new(4, "0800001-00.2024.8.18.0001", "7")]
        );
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(rows_from_range(&range).is_empty());
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("Número do Processo"), "numero_do_processo");
        assert_eq!(normalize_header("  ID-Expediente "), "id_expediente");
        assert_eq!(normalize_header("Nº Processo"), "no_processo");
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Data::Float(98765.0)), "98765");
        assert_eq!(cell_text(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_text(&Data::Int(-3)), "-3");
        assert_eq!(cell_text(&s("  a  ")), "a");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_missing_file() {
        assert!(read_rows(Path::new("/nonexistent/expedientes.xlsx")).is_err());
    }
}
