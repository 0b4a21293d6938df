// Entry point for the batch filer

use anyhow::{bail, Context, Result};
use clap::Parser;
use mni_client::{MniClient, SignedDocument};
use peticiona_core::{progress, read_rows, write_report, BatchRunner, Cli, Config, Summary};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging (stderr, so progress lines on stdout stay clean)
    let default_filter = cli.log_filter();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.phrase.trim().is_empty() {
        bail!("--phrase must not be empty");
    }

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(endpoint = %config.endpoint, "Configuration loaded");

    let mut document = SignedDocument::from_path(&cli.document)
        .with_context(|| format!("Failed to read document {}", cli.document.display()))?
        .with_document_type(cli.document_type.as_str());
    if let Some(mime_type) = &cli.mime_type {
        document = document.with_mime_type(mime_type.as_str());
    }
    if let Some(description) = &cli.description {
        document = document.with_description(description.as_str());
    }

    let rows = read_rows(&cli.input)?;
    if rows.is_empty() {
        bail!(
            "No rows with case number and notice id found in {}",
            cli.input.display()
        );
    }

    let http = reqwest::Client::builder()
        .build()
        .context("Failed to create HTTP client")?;
    let client = MniClient::new(config.credentials.clone())
        .with_client(http)
        .with_endpoint(config.endpoint.as_str())
        .with_query_timeout(config.query_timeout)
        .with_submit_timeout(config.submit_timeout);

    let runner = BatchRunner::new(client, cli.phrase.as_str(), document)
        .with_pause(config.row_pause)
        .dry_run(cli.dry_run);

    // Ctrl-C stops the batch before the next row
    let stop = runner.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Stop requested, finishing current row");
            stop.cancel();
        }
    });

    tracing::info!(rows = rows.len(), dry_run = cli.dry_run, "Starting batch");
    let outcomes = if cli.json {
        runner.run(&rows, |_, _, _| {}).await
    } else {
        runner.run(&rows, progress::print_row).await
    };

    let output = cli.output_path();
    write_report(&output, &outcomes)?;

    let summary = Summary::from_outcomes(&outcomes, rows.len());
    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "report": output.display().to_string(),
                "summary": summary,
                "outcomes": outcomes,
            }))?
        );
    } else {
        progress::print_summary(&summary, &output);
    }

    Ok(())
}
