//! Statement reconstruction: token classification, transaction segmentation,
//! metadata extraction and assembly.

pub mod classifier;
pub mod diagnostics;
mod metadata;
mod parser;
pub mod rules;
pub mod segmenter;
pub mod tokens;

pub use classifier::{Marker, TokenClass, TokenClassifier};
pub use diagnostics::{LineDiagnostic, TokenAnnotation};
pub use metadata::{MetadataExtractor, StatementMetadata};
pub use parser::{HeuristicStatementParser, ParseResult, StatementParser};
pub use segmenter::{ColumnLayout, Segmentation, SegmenterState, TransactionSegmenter};

use serde::{Deserialize, Serialize};

use crate::error::StatementError;
use crate::models::fragment::Line;

/// Result type for statement operations.
pub type Result<T> = std::result::Result<T, StatementError>;

/// Why a candidate row was left out of the transaction list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// No date had been seen before the row.
    NoDateContext,
    /// The opener had no amount within the lookahead window.
    NoAmount,
    /// An amount with no opener in front of it.
    NoOpener,
}

/// A row that looked like activity but could not become a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRow {
    pub page: u32,
    pub raw_line: String,
    pub reason: DropReason,
}

impl DroppedRow {
    pub fn new(line: &Line, reason: DropReason) -> Self {
        Self {
            page: line.page,
            raw_line: line.text.clone(),
            reason,
        }
    }
}
