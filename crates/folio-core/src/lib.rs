//! Core library for bank statement reconstruction.
//!
//! This crate provides:
//! - PDF text recovery with positions (lopdf) and a plain-text fallback
//! - Line reconstruction from positioned fragments
//! - Token classification, transaction segmentation and metadata extraction
//! - Statement models with consistency checks
//! - File loading for PDFs and pre-extracted text

pub mod error;
pub mod input;
pub mod layout;
pub mod models;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod statement;

pub use error::{FolioError, PdfError, Result, StatementError};
pub use input::{is_supported, parse_file, read_lines};
pub use layout::{group_page, group_pages, lines_from_text};
pub use models::config::{AmountStrategy, FolioConfig, ParserConfig, PdfConfig};
pub use models::fragment::{Line, PageFragments, TextFragment};
pub use models::statement::{Period, StatementSummary, Transaction, TransactionType};
#[cfg(feature = "pdf")]
pub use pdf::{FragmentSource, PdfFragmentExtractor, extract_lines};
pub use statement::{
    DropReason, DroppedRow, HeuristicStatementParser, ParseResult, StatementParser, TokenClass,
    TokenClassifier,
};
