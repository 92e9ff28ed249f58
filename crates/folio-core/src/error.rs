//! Error types for the folio-core library.

use thiserror::Error;

/// Main error type for the folio library.
#[derive(Error, Debug)]
pub enum FolioError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Statement reconstruction error.
    #[error("statement error: {0}")]
    Statement(#[from] StatementError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is neither a PDF nor extracted text.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors that abort a statement parse.
///
/// Row-level problems (missing amount, no date yet, malformed numbers) never
/// surface here; those rows are dropped and reported in the parse result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatementError {
    /// None of the configured start-of-activity markers appear in the document.
    #[error("start-of-activity marker not found (looked for: {})", .0.join(", "))]
    ActivityMarkerNotFound(Vec<String>),

    /// The document produced no text lines at all.
    #[error("document contains no text")]
    EmptyDocument,
}

/// Result type for the folio library.
pub type Result<T> = std::result::Result<T, FolioError>;
