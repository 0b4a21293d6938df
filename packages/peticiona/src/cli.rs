use std::path::PathBuf;

use clap::Parser;
use mni_client::DEFAULT_DOCUMENT_TYPE;

#[derive(Parser, Debug)]
#[command(name = "peticiona")]
#[command(about = "Check court notices for a phrase and file a pre-signed document where it appears")]
pub struct Cli {
    /// Spreadsheet with case number and notice id columns (.xlsx, .xls, .ods)
    #[arg(long, short = 'i')]
    pub input: PathBuf,

    /// Phrase that triggers the filing (case-insensitive, contiguous)
    #[arg(long, short = 'p')]
    pub phrase: String,

    /// Pre-signed document to file
    #[arg(long, short = 'd')]
    pub document: PathBuf,

    /// Report path (default: resultado_<timestamp>.xlsx)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// tipoDocumento code sent with the filing
    #[arg(long, default_value = DEFAULT_DOCUMENT_TYPE)]
    pub document_type: String,

    /// Override the mime type inferred from the document extension
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Description sent with the filing (default: file name)
    #[arg(long)]
    pub description: Option<String>,

    /// Only check for the phrase, never file
    #[arg(long)]
    pub dry_run: bool,

    /// Print the summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Debug logging, including why each extraction failed
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "info,peticiona=debug,peticiona_core=debug,mni_client=debug,teor=debug"
        } else {
            "info,peticiona=info"
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "resultado_{}.xlsx",
                chrono::Local::now().format("%Y%m%d_%H%M%S")
            ))
        })
    }
}
