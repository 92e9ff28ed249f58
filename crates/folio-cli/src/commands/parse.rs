//! Parse command - reconstruct a single statement.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use folio_core::models::statement::{StatementSummary, Transaction};
use folio_core::{HeuristicStatementParser, StatementParser};

use super::{load_config, read_lines};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input file (PDF, or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print only the transaction list
    #[arg(long)]
    transactions_only: bool,

    /// Check balances, totals and date order
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output (transactions)
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    info!("Parsing statement: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Reading document...");
    let lines = read_lines(&args.input, &config.pdf).await?;
    debug!("{} lines recovered", lines.len());

    pb.set_message("Reconstructing transactions...");
    let parser = HeuristicStatementParser::with_config(config.parser);
    let result = parser.parse_lines(&lines);
    pb.finish_and_clear();
    let result = result?;

    for warning in &result.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    if args.validate {
        let issues = result.summary.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = if args.transactions_only {
        format_transactions(&result.summary.transactions, args.format)?
    } else {
        format_summary(&result.summary, args.format)?
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

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_summary(summary: &StatementSummary, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
        OutputFormat::Csv => format_csv(&summary.transactions),
        OutputFormat::Text => Ok(format_text(summary)),
    }
}

fn format_transactions(transactions: &[Transaction], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(transactions)?),
        OutputFormat::Csv => format_csv(transactions),
        OutputFormat::Text => Ok(transactions.iter().map(format_row).collect::<Vec<_>>().join("\n")),
    }
}

/// Transactions as CSV, one row each.
pub fn format_csv(transactions: &[Transaction]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
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

    for t in transactions {
        wtr.write_record([
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

fn format_row(t: &Transaction) -> String {
    format!(
        "{:<7} {:<48} {:>12} {:>12}  {}",
        t.date,
        t.description,
        t.amount,
        t.balance.map(|b| b.to_string()).unwrap_or_default(),
        t.category
    )
}

fn format_text(summary: &StatementSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("Account: {}\n", summary.account_number));
    if !summary.period.is_empty() {
        output.push_str(&format!("Period: {} to {}\n", summary.period.from, summary.period.to));
    }
    output.push('\n');

    output.push_str(&format!("  Opening balance:   {}\n", summary.opening_balance));
    output.push_str(&format!("  Total deposits:    {}\n", summary.total_deposits));
    output.push_str(&format!("  Total withdrawals: {}\n", summary.total_withdrawals));
    output.push_str(&format!("  Closing balance:   {}\n", summary.closing_balance));
    output.push('\n');

    output.push_str(&format!("Transactions ({}):\n", summary.transactions.len()));
    for t in &summary.transactions {
        output.push_str(&format_row(t));
        output.push('\n');
    }

    output
}
