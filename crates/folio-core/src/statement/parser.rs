//! Statement assembly.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::diagnostics::{self, LineDiagnostic};
use super::metadata::MetadataExtractor;
use super::rules::Categorizer;
use super::segmenter::TransactionSegmenter;
use super::{DroppedRow, Result};
use crate::error::StatementError;
use crate::layout::{group_pages, lines_from_text};
use crate::models::config::{AmountStrategy, ParserConfig};
use crate::models::fragment::{Line, PageFragments};
use crate::models::statement::{StatementSummary, Transaction};

/// Result of statement parsing.
#[derive(Debug, Clone, Serialize)]
pub struct ParseResult {
    /// Assembled statement.
    pub summary: StatementSummary,
    /// Candidate rows that could not become transactions.
    pub dropped: Vec<DroppedRow>,
    /// Summary fields that were not found.
    pub missing_fields: Vec<String>,
    /// Parse warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for statement parsing.
pub trait StatementParser {
    /// Parse a statement from reconstructed lines in reading order.
    fn parse_lines(&self, lines: &[Line]) -> Result<ParseResult>;

    /// Parse a statement from raw per-page fragments.
    fn parse_pages(&self, pages: &[PageFragments]) -> Result<ParseResult> {
        self.parse_lines(&group_pages(pages))
    }

    /// Parse a statement from plain text, pages separated by form feeds.
    fn parse_text(&self, text: &str) -> Result<ParseResult> {
        self.parse_lines(&lines_from_text(text))
    }

    /// Transactions only.
    fn parse_transactions(&self, lines: &[Line]) -> Result<Vec<Transaction>> {
        Ok(self.parse_lines(lines)?.summary.transactions)
    }
}

/// Rule-based parser for printed statement layouts.
///
/// Holds no per-document state, so one instance can serve concurrent parses.
#[derive(Debug, Clone)]
pub struct HeuristicStatementParser {
    config: ParserConfig,
    segmenter: TransactionSegmenter,
    metadata: MetadataExtractor,
    categorizer: Categorizer,
}

impl HeuristicStatementParser {
    /// Create a parser with the default pattern tables.
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser from a configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            segmenter: TransactionSegmenter::new(&config),
            metadata: MetadataExtractor::new(&config.labels),
            categorizer: Categorizer::new(&config.categories, config.fallback_category.clone()),
            config,
        }
    }

    /// Set the amount assignment strategy.
    pub fn with_amount_strategy(self, strategy: AmountStrategy) -> Self {
        let mut config = self.config;
        config.amount_strategy = strategy;
        Self::with_config(config)
    }

    /// Set how many tokens an opener may scan for its amounts.
    pub fn with_lookahead_window(self, window: usize) -> Self {
        let mut config = self.config;
        config.lookahead_window = window;
        Self::with_config(config)
    }

    /// Set how many description lines may follow the amount row.
    pub fn with_max_continuation_lines(self, lines: usize) -> Self {
        let mut config = self.config;
        config.max_continuation_lines = lines;
        Self::with_config(config)
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Per-line classification dump for troubleshooting a layout.
    pub fn diagnose(&self, lines: &[Line]) -> Vec<LineDiagnostic> {
        diagnostics::annotate(lines, self.segmenter.classifier())
    }
}

impl Default for HeuristicStatementParser {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementParser for HeuristicStatementParser {
    fn parse_lines(&self, lines: &[Line]) -> Result<ParseResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        if lines.is_empty() {
            return Err(StatementError::EmptyDocument);
        }

        info!("Parsing statement from {} lines", lines.len());

        let metadata = self.metadata.extract(lines);
        for field in &metadata.missing_fields {
            warnings.push(format!("Could not extract {}", field.replace('_', " ")));
        }

        let segmentation = self.segmenter.segment(lines)?;

        let years = metadata.year_map();
        let period_label = metadata.period.label();
        if years.is_empty() && !segmentation.transactions.is_empty() {
            warn!("No dated statement period; calendar dates left unresolved");
            warnings.push("Statement period has no year; calendar dates left unresolved".to_string());
        }

        let transactions: Vec<Transaction> = segmentation
            .transactions
            .into_iter()
            .map(|mut t| {
                t.posted_on = years.resolve(&t.date);
                t.statement_period = period_label.clone();
                t.category = self
                    .categorizer
                    .categorize(&t.description, t.transaction_type)
                    .to_string();
                t
            })
            .collect();

        if !segmentation.dropped.is_empty() {
            warnings.push(format!(
                "Dropped {} row(s) that could not be read as transactions",
                segmentation.dropped.len()
            ));
        }

        let summary = StatementSummary {
            account_number: metadata.account_number,
            period: metadata.period,
            opening_balance: metadata.opening_balance,
            closing_balance: metadata.closing_balance,
            total_deposits: metadata.total_deposits,
            total_withdrawals: metadata.total_withdrawals,
            transactions,
        };

        debug!(
            "Parsed {} transactions ({} dropped), {} warnings",
            summary.transactions.len(),
            segmentation.dropped.len(),
            warnings.len()
        );

        Ok(ParseResult {
            summary,
            dropped: segmentation.dropped,
            missing_fields: metadata.missing_fields,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
