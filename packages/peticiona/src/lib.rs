//! Notice-driven batch filing.
//!
//! For each spreadsheet row (case number + notice id): fetch the notice
//! content from the court service, check it for a phrase and, when found,
//! file a pre-signed document. Every row ends up in an Excel report.
//!
//! # Modules
//!
//! - [`config`] - Environment configuration (credentials, timeouts, pause)
//! - [`cli`] - Command line arguments
//! - [`spreadsheet`] - Input rows
//! - [`batch`] - Sequential runner
//! - [`progress`] - Console output
//! - [`report`] - Excel report and summary

pub mod batch;
pub mod cli;
pub mod config;
pub mod progress;
pub mod report;
pub mod spreadsheet;

pub use batch::{BatchRunner, RowOutcome, RowStatus};
pub use cli::Cli;
pub use config::Config;
pub use report::{write_report, Summary};
pub use spreadsheet::{read_rows, NoticeRow};
