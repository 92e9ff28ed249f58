//! Reading statement files from disk.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{FolioError, Result};
use crate::layout::lines_from_text;
use crate::models::config::{FolioConfig, PdfConfig};
use crate::models::fragment::Line;
use crate::statement::{HeuristicStatementParser, ParseResult, StatementParser};

/// Kind of statement file, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Pdf,
    Text,
}

impl InputKind {
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }
}

/// Whether `read_lines` accepts this path.
pub fn is_supported(path: &Path) -> bool {
    InputKind::of(path).is_some()
}

/// Reconstructed lines of a statement file.
///
/// PDFs go through the positioned-text extractor; `.txt` files are read as
/// text already extracted by some other tool, pages split on form feeds.
pub fn read_lines(path: &Path, pdf: &PdfConfig) -> Result<Vec<Line>> {
    let kind = InputKind::of(path).ok_or_else(|| {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        FolioError::UnsupportedFormat(ext.to_string())
    })?;

    match kind {
        #[cfg(feature = "pdf")]
        InputKind::Pdf => {
            let data = fs::read(path)?;
            Ok(crate::pdf::extract_lines(&data, pdf)?)
        }
        #[cfg(not(feature = "pdf"))]
        InputKind::Pdf => {
            let _ = pdf;
            Err(FolioError::UnsupportedFormat("pdf".to_string()))
        }
        InputKind::Text => {
            let text = fs::read_to_string(path)?;
            Ok(lines_from_text(&text))
        }
    }
}

/// Read and parse one statement file with the given configuration.
pub fn parse_file(path: &Path, config: &FolioConfig) -> Result<ParseResult> {
    let lines = read_lines(path, &config.pdf)?;
    let parser = HeuristicStatementParser::with_config(config.parser.clone());
    let result = parser.parse_lines(&lines)?;

    info!(
        "{}: {} transactions in {}ms",
        path.display(),
        result.summary.transactions.len(),
        result.processing_time_ms
    );

    Ok(result)
}
