//! Inspect command - show how each line of a statement is read.

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use folio_core::HeuristicStatementParser;
use folio_core::statement::diagnostics;

use super::{load_config, read_lines};

/// Arguments for the inspect command.
#[derive(Args)]
pub struct InspectArgs {
    /// Input file (PDF, or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: InspectFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum InspectFormat {
    /// One annotated line per statement line
    Text,
    /// JSON array of line diagnostics
    Json,
}

pub async fn run(args: InspectArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    info!("Inspecting statement: {}", args.input.display());

    let lines = read_lines(&args.input, &config.pdf).await?;
    let parser = HeuristicStatementParser::with_config(config.parser);
    let report = parser.diagnose(&lines);

    match args.format {
        InspectFormat::Text => print!("{}", diagnostics::render(&report)),
        InspectFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}
