//! Console progress lines and end-of-run summary.

use std::path::Path;

use colored::{ColoredString, Colorize};

use crate::batch::{RowOutcome, RowStatus};
use crate::report::Summary;

fn colorize(status: &RowStatus) -> ColoredString {
    let text = status.to_string();
    match status {
        RowStatus::Filed { .. } | RowStatus::Matched => text.bright_green(),
        RowStatus::NoMatch | RowStatus::Unavailable => text.yellow(),
        RowStatus::Error { .. } => text.bright_red(),
    }
}

/// Progress line for one processed row.
pub fn format_row(position: usize, total: usize, outcome: &RowOutcome) -> String {
    format!(
        "{} {} / {} → {}",
        format!("[{position}/{total}]").dimmed(),
        outcome.row.case_number,
        outcome.row.notice_id,
        colorize(&outcome.status)
    )
}

/// Progress callback for [`BatchRunner::run`](crate::batch::BatchRunner::run).
pub fn print_row(position: usize, total: usize, outcome: &RowOutcome) {
    println!("{}", format_row(position, total, outcome));
}

pub fn print_summary(summary: &Summary, report: &Path) {
    println!();
    if summary.stopped_early() {
        println!(
            "{}",
            format!(
                "Interrompido: {} de {} linhas processadas",
                summary.processed, summary.total
            )
            .bright_yellow()
            .bold()
        );
    } else {
        println!(
            "{}",
            format!("Concluído: {} linhas processadas", summary.processed)
                .bright_green()
                .bold()
        );
    }

    println!("  {} {}", "✓ Manifestações enviadas:".bright_green(), summary.filed);
    if summary.matched > 0 {
        println!("  {} {}", "✓ Correspondências (simulação):".bright_green(), summary.matched);
    }
    println!("  {} {}", "• Sem correspondência:".yellow(), summary.no_match);
    println!("  {} {}", "• Teor indisponível:".yellow(), summary.unavailable);
    println!("  {} {}", "✗ Erros:".bright_red(), summary.errors);
    for (message, count) in &summary.error_messages {
        println!("      {count}× {message}");
    }

    println!();
    println!("Relatório: {}", report.display().to_string().bright_blue());
}
