//! Batch command - parse many statements and merge their transactions.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use folio_core::models::config::PdfConfig;
use folio_core::models::statement::Transaction;
use folio_core::{HeuristicStatementParser, ParseResult, StatementParser};

use super::{is_supported, load_config, read_lines};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output file for the merged transactions (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: BatchFormat,

    /// Also write a per-file summary CSV
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum BatchFormat {
    /// JSON array of transactions
    Json,
    /// CSV with a source column
    Csv,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    result: Option<ParseResult>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// A transaction tagged with the statement it came from.
#[derive(Debug, Serialize)]
struct SourcedTransaction<'a> {
    source: &'a str,
    #[serde(flatten)]
    transaction: &'a Transaction,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_supported(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let parser = Arc::new(HeuristicStatementParser::with_config(config.parser));
    let semaphore = Arc::new(Semaphore::new(args.jobs.max(1)));
    let mut tasks = JoinSet::new();

    for (index, path) in files.into_iter().enumerate() {
        let parser = Arc::clone(&parser);
        let semaphore = Arc::clone(&semaphore);
        let pdf = config.pdf.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (index, process_single_file(path, &parser, &pdf).await)
        });
    }

    let mut results = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined?;
        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                pb.abandon();
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                anyhow::bail!("Processing failed for {}: {}", result.path.display(), error_msg);
            }
        }
        results.push((index, result));
        pb.inc(1);
    }

    pb.finish_and_clear();
    results.sort_by_key(|(index, _)| *index);
    let results: Vec<ProcessResult> = results.into_iter().map(|(_, r)| r).collect();

    let merged = merge_transactions(&results);
    let output = match args.format {
        BatchFormat::Json => serde_json::to_string_pretty(&merged)?,
        BatchFormat::Csv => format_merged_csv(&merged)?,
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed, {} transactions",
        style(results.len() - failed.len()).green(),
        style(failed.len()).red(),
        merged.len()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn process_single_file(
    path: PathBuf,
    parser: &HeuristicStatementParser,
    pdf: &PdfConfig,
) -> ProcessResult {
    let file_start = Instant::now();
    let outcome = match read_lines(&path, pdf).await {
        Ok(lines) => parser.parse_lines(&lines).map_err(anyhow::Error::from),
        Err(e) => Err(e),
    };
    let processing_time_ms = file_start.elapsed().as_millis() as u64;

    match outcome {
        Ok(result) => {
            debug!(
                "{}: {} transactions, {} dropped",
                path.display(),
                result.summary.transactions.len(),
                result.dropped.len()
            );
            ProcessResult {
                path,
                result: Some(result),
                error: None,
                processing_time_ms,
            }
        }
        Err(e) => ProcessResult {
            path,
            result: None,
            error: Some(format!("{:#}", e)),
            processing_time_ms,
        },
    }
}

fn source_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

/// Transactions of every successful file, ordered by calendar date.
///
/// The sort is stable, so rows keep statement order within a day and rows
/// without a calendar date keep their place at the end.
fn merge_transactions(results: &[ProcessResult]) -> Vec<SourcedTransaction<'_>> {
    let mut merged: Vec<SourcedTransaction<'_>> = results
        .iter()
        .filter_map(|r| r.result.as_ref().map(|parsed| (source_name(&r.path), parsed)))
        .flat_map(|(source, parsed)| {
            parsed
                .summary
                .transactions
                .iter()
                .map(move |transaction| SourcedTransaction { source, transaction })
        })
        .collect();

    merged.sort_by_key(|t| (t.transaction.posted_on.is_none(), t.transaction.posted_on));
    merged
}

fn format_merged_csv(transactions: &[SourcedTransaction<'_>]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "source",
        "date",
        "posted_on",
        "description",
        "type_line",
        "merchant",
        "amount",
        "type",
        "balance",
        "category",
        "statement_period",
    ])?;

    for row in transactions {
        let t = row.transaction;
        wtr.write_record([
            row.source,
            t.date.as_str(),
            &t.posted_on.map(|d| d.to_string()).unwrap_or_default(),
            t.description.as_str(),
            t.type_line.as_str(),
            t.merchant.as_str(),
            &t.amount.to_string(),
            t.transaction_type.as_str(),
            &t.balance.map(|b| b.to_string()).unwrap_or_default(),
            t.category.as_str(),
            t.statement_period.as_str(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "account_number",
        "period_from",
        "period_to",
        "transactions",
        "dropped",
        "opening_balance",
        "closing_balance",
        "issues",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = source_name(&result.path);

        if let Some(parsed) = &result.result {
            let summary = &parsed.summary;
            wtr.write_record([
                filename,
                "success",
                &summary.account_number,
                &summary.period.from,
                &summary.period.to,
                &summary.transactions.len().to_string(),
                &parsed.dropped.len().to_string(),
                &summary.opening_balance.to_string(),
                &summary.closing_balance.to_string(),
                &summary.validate().len().to_string(),
                &result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                "",
                &result.processing_time_ms.to_string(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
