//! Integration tests for a full run: spreadsheet in, court calls against a
//! mock service, report out.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use calamine::{open_workbook_auto, Data, Reader};
use mni_client::testing::{multipart_response, MockCourtService};
use mni_client::SignedDocument;
use peticiona_core::{read_rows, write_report, BatchRunner, RowStatus, Summary};
use rust_xlsxwriter::Workbook;

const PHRASE: &str = "apresentar contrarrazões";

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("peticiona_{}_{}", std::process::id(), name))
}

/// Input spreadsheet with a header row and the given (case, notice) lines.
fn write_input(path: &Path, rows: &[(&str, &str)]) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Processo").unwrap();
    sheet.write_string(0, 1, "Expediente").unwrap();
    for (idx, (case_number, notice_id)) in rows.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, *case_number).unwrap();
        sheet.write_string(row, 1, *notice_id).unwrap();
    }
    workbook.save(path).unwrap();
}

fn base64_notice(cid: &str, html: &str) -> String {
    multipart_response(cid, &STANDARD.encode(html.as_bytes()))
}

#[tokio::test]
async fn test_spreadsheet_to_report() {
    let input = temp_path("input.xlsx");
    let output = temp_path("output.xlsx");

    write_input(
        &input,
        &[
            ("0801234-56.2023.8.18.0140", "1001"),
            ("0800001-00.2024.8.18.0001", "1002"),
            ("0800002-00.2024.8.18.0002", "1003"),
            ("0800003-00.2024.8.18.0003", "1004"),
        ],
    );

    let mock = MockCourtService::new()
        .with_notice(
            "0801234-56.2023.8.18.0140",
            "1001",
            base64_notice(
                "teor-1001",
                "<html><p>Fica a parte recorrida intimada para <b>apresentar</b> contrarrazões.</p></html>",
            ),
        )
        .with_notice(
            "0800001-00.2024.8.18.0001",
            "1002",
            base64_notice("teor-1002", "<p>Arquivem-se os autos.</p>"),
        )
        .with_notice(
            "0800002-00.2024.8.18.0002",
            "1003",
            "<soap:Fault><faultstring>Aviso inexistente</faultstring></soap:Fault>",
        );
    // 1004 has no canned answer: the query fails

    let rows = read_rows(&input).unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].line, 2);

    let document = SignedDocument::new("contrarrazoes.pdf", b"%PDF-1.4 assinado".to_vec());
    let runner = BatchRunner::new(mock.clone(), PHRASE, document).with_pause(Duration::ZERO);

    let mut positions = Vec::new();
    let outcomes = runner
        .run(&rows, |position, total, _| positions.push((position, total)))
        .await;

    assert_eq!(positions, vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
    assert_eq!(
        outcomes[0].status,
        RowStatus::Filed {
            protocol: Some("PROT-1".to_string())
        }
    );
    assert_eq!(outcomes[1].status, RowStatus::NoMatch);
    assert_eq!(outcomes[2].status, RowStatus::Unavailable);
    assert!(outcomes[3].status.is_error());
    assert_eq!(mock.filed_cases(), vec!["0801234-56.2023.8.18.0140"]);

    write_report(&output, &outcomes).unwrap();

    let mut workbook = open_workbook_auto(&output).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    assert_eq!(range.height(), 5);
    assert_eq!(
        range.get_value((1, 3)),
        Some(&Data::String(
            "Manifestação enviada (protocolo PROT-1)".to_string()
        ))
    );
    assert_eq!(
        range.get_value((3, 3)),
        Some(&Data::String("Não foi possível obter o teor".to_string()))
    );
    match range.get_value((1, 5)) {
        Some(Data::String(excerpt)) => assert!(excerpt.contains(PHRASE)),
        other => panic!("unexpected excerpt cell: {other:?}"),
    }

    let summary = Summary::from_outcomes(&outcomes, rows.len());
    assert_eq!(summary.filed, 1);
    assert_eq!(summary.no_match, 1);
    assert_eq!(summary.unavailable, 1);
    assert_eq!(summary.errors, 1);
    assert!(!summary.stopped_early());

    std::fs::remove_file(&input).ok();
    std::fs::remove_file(&output).ok();
}

#[tokio::test]
async fn test_dry_run_reports_matches_without_filing() {
    let mock = MockCourtService::new().with_notice(
        "0801234-56.2023.8.18.0140",
        "1001",
        base64_notice("x", "<p>APRESENTAR CONTRARRAZÕES</p>"),
    );
    let rows = vec![peticiona_core::NoticeRow::new(2, "0801234-56.2023.8.18.0140", "1001")];

    let outcomes = BatchRunner::new(mock.clone(), PHRASE, SignedDocument::new("a.pdf", vec![]))
        .with_pause(Duration::ZERO)
        .dry_run(true)
        .run(&rows, |_, _, _| {})
        .await;

    assert_eq!(outcomes[0].status, RowStatus::Matched);
    assert_eq!(outcomes[0].excerpt.as_deref(), Some("apresentar contrarrazões"));
    assert!(mock.filed_cases().is_empty());
}
