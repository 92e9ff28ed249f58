//! Transaction segmentation.
//!
//! A single left-to-right pass over the activity section. The walk keeps a
//! sticky date, starts a record at every opener, and looks ahead a bounded
//! number of tokens for the record's amounts and continuation text.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::classifier::{TokenClass, TokenClassifier};
use super::rules::{DirectionRules, amount_shape, parse_date_token};
use super::tokens::{Token, tokenize};
use super::{DropReason, DroppedRow, Result};
use crate::error::StatementError;
use crate::models::config::{AmountStrategy, ParserConfig};
use crate::models::fragment::Line;
use crate::models::statement::{Transaction, TransactionType};

/// Most amounts a single record can carry (withdrawal, deposit, balance).
const MAX_AMOUNTS: usize = 3;

/// Where the walk is relative to the activity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmenterState {
    SeekingStart,
    InActivity,
    Done,
}

/// Column a positioned amount falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Withdrawal,
    Deposit,
    Balance,
}

/// Left edges of the amount columns, read from a table header row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub withdrawal_x: f32,
    pub deposit_x: f32,
    pub balance_x: f32,
}

impl ColumnLayout {
    /// Read the layout from a header row whose withdrawal, deposit and
    /// balance titles sit in separate cells, left to right.
    pub fn from_header(line: &Line) -> Option<Self> {
        let find = |word: &str| {
            line.cells
                .iter()
                .find(|c| c.text.to_lowercase().contains(word))
                .map(|c| c.x)
        };
        let layout = Self {
            withdrawal_x: find("withdrawal")?,
            deposit_x: find("deposit")?,
            balance_x: find("balance")?,
        };
        if layout.withdrawal_x < layout.deposit_x && layout.deposit_x < layout.balance_x {
            Some(layout)
        } else {
            None
        }
    }

    /// Column for an amount, using its right edge when known.
    pub fn column_of(&self, x: f32, right: Option<f32>) -> Column {
        // Right-aligned figures end inside their own column.
        let edge = right.map(|r| r - 1.0).unwrap_or(x);
        if edge >= self.balance_x {
            Column::Balance
        } else if edge >= self.deposit_x {
            Column::Deposit
        } else {
            Column::Withdrawal
        }
    }
}

/// Output of one segmentation pass.
#[derive(Debug, Clone, Default)]
pub struct Segmentation {
    /// Transactions in document order, without category or calendar date.
    pub transactions: Vec<Transaction>,
    pub dropped: Vec<DroppedRow>,
    pub columns: Option<ColumnLayout>,
}

#[derive(Debug, Clone)]
struct AmountHit {
    value: Decimal,
    balance_like: bool,
    x: Option<f32>,
    right: Option<f32>,
}

#[derive(Debug, Default)]
struct PendingRecord {
    /// Description text with the line it came from.
    parts: Vec<(usize, String)>,
    lines: Vec<usize>,
    amounts: Vec<AmountHit>,
}

impl PendingRecord {
    fn push_text(&mut self, token: &Token) {
        self.parts.push((token.line, token.text.clone()));
        self.touch(token.line);
    }

    fn touch(&mut self, line: usize) {
        if !self.lines.contains(&line) {
            self.lines.push(line);
        }
    }

    /// Text on the opener's line, then text from the lines below it.
    fn split_description(&self) -> (String, String) {
        let opener_line = self.parts.first().map(|(line, _)| *line);
        let (head, rest): (Vec<_>, Vec<_>) = self
            .parts
            .iter()
            .partition(|(line, _)| Some(*line) == opener_line);
        let join = |parts: Vec<&(usize, String)>| {
            parts
                .into_iter()
                .map(|(_, text)| text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };
        (join(head), join(rest))
    }
}

/// Segments the activity table into transactions.
#[derive(Debug, Clone)]
pub struct TransactionSegmenter {
    classifier: TokenClassifier,
    directions: DirectionRules,
    lookahead_window: usize,
    max_continuation_lines: usize,
    strategy: AmountStrategy,
}

impl TransactionSegmenter {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            classifier: TokenClassifier::new(config),
            directions: DirectionRules::new(&config.deposit_patterns, &config.withdrawal_patterns),
            lookahead_window: config.lookahead_window.max(1),
            max_continuation_lines: config.max_continuation_lines,
            strategy: config.amount_strategy,
        }
    }

    pub fn classifier(&self) -> &TokenClassifier {
        &self.classifier
    }

    /// Segment a whole document.
    ///
    /// Fails only when no activity marker is found.
    pub fn segment(&self, lines: &[Line]) -> Result<Segmentation> {
        let (section, mut columns) = self.activity_section(lines)?;

        let mut kept: Vec<&Line> = Vec::with_capacity(section.len());
        for line in section {
            if self.classifier.is_header_noise(&line.text) {
                if let Some(layout) = ColumnLayout::from_header(line) {
                    trace!("Column layout from repeated header: {:?}", layout);
                    columns = Some(layout);
                }
                continue;
            }
            if self.classifier.is_footer_noise(&line.text) {
                trace!("Skipping footer line {:?}", line.text);
                continue;
            }
            kept.push(line);
        }

        let tokens = tokenize(&kept);
        debug!("Activity section: {} lines, {} tokens", kept.len(), tokens.len());

        let (transactions, dropped) = self.walk(&tokens, &kept, columns.as_ref());
        Ok(Segmentation {
            transactions,
            dropped,
            columns,
        })
    }

    /// Lines between the activity marker and the closing or end marker.
    fn activity_section<'a>(
        &self,
        lines: &'a [Line],
    ) -> Result<(Vec<&'a Line>, Option<ColumnLayout>)> {
        let mut state = SegmenterState::SeekingStart;
        let mut section = Vec::new();
        let mut columns = None;

        for line in lines {
            match state {
                SegmenterState::SeekingStart => {
                    if let Some(layout) = ColumnLayout::from_header(line) {
                        columns = Some(layout);
                    }
                    if self.classifier.is_activity_marker(&line.text) {
                        debug!("Activity starts on page {} at {:?}", line.page, line.text);
                        state = SegmenterState::InActivity;
                    }
                }
                SegmenterState::InActivity => {
                    if self.classifier.is_closing_marker(&line.text)
                        || self.classifier.is_end_marker(&line.text)
                    {
                        debug!("Activity ends on page {} at {:?}", line.page, line.text);
                        state = SegmenterState::Done;
                        break;
                    }
                    section.push(line);
                }
                SegmenterState::Done => break,
            }
        }

        if state == SegmenterState::SeekingStart {
            return Err(StatementError::ActivityMarkerNotFound(
                self.classifier.activity_marker_phrases(),
            ));
        }
        if state == SegmenterState::InActivity {
            debug!("No closing marker; activity runs to the end of the document");
        }
        Ok((section, columns))
    }

    fn walk(
        &self,
        tokens: &[Token],
        lines: &[&Line],
        columns: Option<&ColumnLayout>,
    ) -> (Vec<Transaction>, Vec<DroppedRow>) {
        let line_has_amount = self.lines_with_amounts(tokens, lines.len());
        let mut transactions = Vec::new();
        let mut dropped: Vec<DroppedRow> = Vec::new();
        let mut current_date: Option<String> = None;
        let mut i = 0;

        while i < tokens.len() {
            let token = &tokens[i];
            let previous = i.checked_sub(1).map(|p| tokens[p].text.as_str());

            match self.classifier.primary(&token.text, previous) {
                TokenClass::Date => {
                    current_date = parse_date_token(&token.text).map(|d| d.label());
                    i += 1;
                }
                TokenClass::TransactionOpener => {
                    let (record, next) = self.collect(tokens, i, &line_has_amount);
                    i = next;
                    match self.finish(record, current_date.as_deref(), lines, columns) {
                        Ok(transaction) => transactions.push(transaction),
                        Err(row) => {
                            debug!("Dropping row ({:?}): {:?}", row.reason, row.raw_line);
                            dropped.push(row);
                        }
                    }
                }
                class if class.is_amount() => {
                    let line = lines[token.line];
                    let repeat = dropped.last().is_some_and(|d| {
                        d.reason == DropReason::NoOpener && d.raw_line == line.text
                    });
                    if !repeat {
                        debug!("Amount without an opener: {:?}", line.text);
                        dropped.push(DroppedRow::new(line, DropReason::NoOpener));
                    }
                    i += 1;
                }
                _ => {
                    trace!("Skipping stray token {:?}", token.text);
                    i += 1;
                }
            }
        }

        (transactions, dropped)
    }

    fn lines_with_amounts(&self, tokens: &[Token], count: usize) -> Vec<bool> {
        let mut flags = vec![false; count];
        for token in tokens {
            if self.classifier.amount(&token.text).is_some() {
                flags[token.line] = true;
            }
        }
        flags
    }

    /// Gather the opener, its reference code, description continuations and
    /// amounts. Returns the record and the index of the first unused token.
    fn collect(
        &self,
        tokens: &[Token],
        start: usize,
        line_has_amount: &[bool],
    ) -> (PendingRecord, usize) {
        let mut record = PendingRecord::default();
        record.push_text(&tokens[start]);
        let mut j = start + 1;

        if j < tokens.len()
            && self
                .classifier
                .is_reference_code(&tokens[j].text, Some(&tokens[start].text))
        {
            record.push_text(&tokens[j]);
            j += 1;
        }

        let mut scanned = 0;
        while j < tokens.len() && scanned < self.lookahead_window && record.amounts.len() < MAX_AMOUNTS {
            let token = &tokens[j];

            // A printed zero is an empty column, not a value.
            if amount_shape(&token.text).is_some_and(|v| v.is_zero()) {
                record.touch(token.line);
                j += 1;
                scanned += 1;
                continue;
            }

            let class = self.classifier.primary(&token.text, Some(&tokens[j - 1].text));
            match class {
                TokenClass::Date | TokenClass::TransactionOpener => break,
                c if c.is_amount() => {
                    if let Some(value) = self.classifier.amount(&token.text) {
                        record.amounts.push(AmountHit {
                            value,
                            balance_like: c == TokenClass::BalanceAmount,
                            x: token.x,
                            right: token.right,
                        });
                    }
                    record.touch(token.line);
                }
                c if c.is_noise() => trace!("Skipping noise token {:?}", token.text),
                _ if record.amounts.is_empty() => record.push_text(token),
                _ => break,
            }
            j += 1;
            scanned += 1;
        }

        if !record.amounts.is_empty() {
            j = self.absorb_continuation(tokens, j, &mut record, line_has_amount);
        }

        (record, j)
    }

    /// Description lines printed below the amount row.
    fn absorb_continuation(
        &self,
        tokens: &[Token],
        mut j: usize,
        record: &mut PendingRecord,
        line_has_amount: &[bool],
    ) -> usize {
        let mut extra_lines = 0;
        while j < tokens.len() {
            let token = &tokens[j];
            let class = self.classifier.primary(&token.text, Some(&tokens[j - 1].text));
            if !matches!(class, TokenClass::Unclassified | TokenClass::ReferenceCode) {
                break;
            }
            if line_has_amount[token.line] {
                break;
            }
            if !record.lines.contains(&token.line) {
                if extra_lines == self.max_continuation_lines {
                    break;
                }
                extra_lines += 1;
            }
            record.push_text(token);
            j += 1;
        }
        j
    }

    fn finish(
        &self,
        record: PendingRecord,
        date: Option<&str>,
        lines: &[&Line],
        columns: Option<&ColumnLayout>,
    ) -> std::result::Result<Transaction, DroppedRow> {
        let raw_line = record
            .lines
            .iter()
            .map(|&l| lines[l].text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let page = record.lines.first().map(|&l| lines[l].page).unwrap_or(0);
        let reject = |reason| DroppedRow {
            page,
            raw_line: raw_line.clone(),
            reason,
        };

        let Some(date) = date else {
            return Err(reject(DropReason::NoDateContext));
        };
        let description = record
            .parts
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let (type_line, merchant) = record.split_description();

        let assigned = match (self.strategy, columns) {
            (AmountStrategy::Columns, Some(layout))
                if record.amounts.iter().all(|a| a.x.is_some()) =>
            {
                self.assign_by_column(&record.amounts, layout)
            }
            _ => self.assign_by_position(&record.amounts, &description),
        };
        let Some((magnitude, direction, balance)) = assigned else {
            return Err(reject(DropReason::NoAmount));
        };

        Ok(Transaction {
            date: date.to_string(),
            posted_on: None,
            description,
            type_line,
            merchant,
            amount: direction.signed(magnitude),
            transaction_type: direction,
            balance,
            category: String::new(),
            statement_period: String::new(),
            raw_line,
        })
    }

    /// First amount is the transaction; the balance is the first
    /// balance-like amount after it, or else the second amount.
    fn assign_by_position(
        &self,
        amounts: &[AmountHit],
        description: &str,
    ) -> Option<(Decimal, TransactionType, Option<Decimal>)> {
        let (first, rest) = amounts.split_first()?;
        let balance = rest
            .iter()
            .find(|a| a.balance_like)
            .or_else(|| rest.first())
            .map(|a| a.value);
        Some((first.value, self.directions.classify(description), balance))
    }

    fn assign_by_column(
        &self,
        amounts: &[AmountHit],
        layout: &ColumnLayout,
    ) -> Option<(Decimal, TransactionType, Option<Decimal>)> {
        let mut withdrawal = None;
        let mut deposit = None;
        let mut balance = None;

        for hit in amounts {
            let x = hit.x?;
            let slot = match layout.column_of(x, hit.right) {
                Column::Withdrawal => &mut withdrawal,
                Column::Deposit => &mut deposit,
                Column::Balance => &mut balance,
            };
            if slot.is_none() {
                *slot = Some(hit.value);
            }
        }

        let (magnitude, direction) = match (withdrawal, deposit) {
            (Some(w), Some(d)) => {
                warn!("Both withdrawal ({}) and deposit ({}) columns set; using withdrawal", w, d);
                (w, TransactionType::Withdrawal)
            }
            (Some(w), None) => (w, TransactionType::Withdrawal),
            (None, Some(d)) => (d, TransactionType::Deposit),
            (None, None) => return None,
        };
        Some((magnitude, direction, balance))
    }
}

impl Default for TransactionSegmenter {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}
