//! Statement and transaction data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of money movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money in.
    Deposit,
    /// Money out.
    Withdrawal,
}

impl TransactionType {
    /// Apply this direction's sign to an unsigned magnitude.
    pub fn signed(self, magnitude: Decimal) -> Decimal {
        match self {
            Self::Deposit => magnitude.abs(),
            Self::Withdrawal => -magnitude.abs(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reconstructed statement row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Date token as printed on the statement (e.g. "12 Jan").
    pub date: String,

    /// Calendar date, when the statement period pins down the year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posted_on: Option<NaiveDate>,

    /// Description text, including continuation lines.
    pub description: String,

    /// Description text printed on the opener's own line.
    #[serde(default)]
    pub type_line: String,

    /// Continuation text from the lines below the opener, usually the merchant.
    #[serde(default)]
    pub merchant: String,

    /// Signed amount: positive for deposits, negative for withdrawals.
    pub amount: Decimal,

    /// Direction of the transaction.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,

    /// Running balance printed alongside the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,

    /// Spending category assigned by the category rules.
    #[serde(default)]
    pub category: String,

    /// Label of the statement period the row was printed in.
    #[serde(default)]
    pub statement_period: String,

    /// Source line text the record was built from.
    pub raw_line: String,
}

impl Transaction {
    /// Unsigned amount.
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }

    pub fn is_deposit(&self) -> bool {
        self.transaction_type == TransactionType::Deposit
    }

    /// Whether the sign of `amount` agrees with `transaction_type`.
    pub fn sign_is_consistent(&self) -> bool {
        match self.transaction_type {
            TransactionType::Deposit => self.amount > Decimal::ZERO,
            TransactionType::Withdrawal => self.amount < Decimal::ZERO,
        }
    }
}

/// Statement period as printed in the document header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Start of the period, verbatim.
    pub from: String,
    /// End of the period, verbatim.
    pub to: String,
    /// Parsed start date, when the printed text carries a year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    /// Parsed end date, when the printed text carries a year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl Period {
    pub fn is_empty(&self) -> bool {
        self.from.is_empty() && self.to.is_empty()
    }

    /// Short label such as "Dec 2025 - Jan 2026", or the printed bounds when
    /// the dates could not be parsed.
    pub fn label(&self) -> String {
        match (self.start, self.end) {
            (Some(start), Some(end)) => {
                format!("{} - {}", start.format("%b %Y"), end.format("%b %Y"))
            }
            _ if self.is_empty() => String::new(),
            _ => format!("{} to {}", self.from, self.to),
        }
    }
}

/// Fully assembled statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSummary {
    /// Account identifier, empty when not found.
    pub account_number: String,

    /// Statement period.
    pub period: Period,

    /// Opening balance (zero when not found).
    pub opening_balance: Decimal,

    /// Closing balance (zero when not found).
    pub closing_balance: Decimal,

    /// Total deposits as printed (zero when not found).
    pub total_deposits: Decimal,

    /// Total withdrawals as printed, unsigned (zero when not found).
    pub total_withdrawals: Decimal,

    /// Transactions in statement order.
    pub transactions: Vec<Transaction>,
}

impl StatementSummary {
    /// Sum of deposit amounts.
    pub fn computed_deposits(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| t.is_deposit())
            .map(|t| t.magnitude())
            .sum()
    }

    /// Sum of withdrawal amounts, unsigned.
    pub fn computed_withdrawals(&self) -> Decimal {
        self.transactions
            .iter()
            .filter(|t| !t.is_deposit())
            .map(|t| t.magnitude())
            .sum()
    }

    /// Check the statement for consistency problems.
    ///
    /// Nothing here is enforced at construction time; the returned list is
    /// advisory and empty when every check passes or cannot be performed.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let tolerance = Decimal::new(1, 2);

        for (i, t) in self.transactions.iter().enumerate() {
            if !t.sign_is_consistent() {
                issues.push(format!(
                    "Row {} ({}): amount {} disagrees with type {}",
                    i, t.date, t.amount, t.transaction_type
                ));
            }
        }

        let balances_known = !self.opening_balance.is_zero() || !self.closing_balance.is_zero();
        let totals_known = !self.total_deposits.is_zero() || !self.total_withdrawals.is_zero();
        if balances_known && totals_known {
            let expected = self.opening_balance + self.total_deposits - self.total_withdrawals;
            if (expected - self.closing_balance).abs() > tolerance {
                issues.push(format!(
                    "Closing balance ({}) differs from opening + deposits - withdrawals ({})",
                    self.closing_balance, expected
                ));
            }
        }

        if !self.total_deposits.is_zero() {
            let computed = self.computed_deposits();
            if (computed - self.total_deposits).abs() > tolerance {
                issues.push(format!(
                    "Deposits found ({}) differ from printed total ({})",
                    computed, self.total_deposits
                ));
            }
        }

        if !self.total_withdrawals.is_zero() {
            let computed = self.computed_withdrawals();
            if (computed - self.total_withdrawals).abs() > tolerance {
                issues.push(format!(
                    "Withdrawals found ({}) differ from printed total ({})",
                    computed, self.total_withdrawals
                ));
            }
        }

        // Running balance continuity between rows that print a balance.
        let mut last_balance = if self.opening_balance.is_zero() {
            None
        } else {
            Some(self.opening_balance)
        };
        let mut pending = Decimal::ZERO;
        for t in &self.transactions {
            pending += t.amount;
            if let Some(balance) = t.balance {
                if let Some(previous) = last_balance {
                    if (previous + pending - balance).abs() > tolerance {
                        issues.push(format!(
                            "Balance {} after \"{}\" does not follow from previous balance {}",
                            balance, t.description, previous
                        ));
                    }
                }
                last_balance = Some(balance);
                pending = Decimal::ZERO;
            }
        }

        let mut previous: Option<NaiveDate> = None;
        for t in &self.transactions {
            if let Some(date) = t.posted_on {
                if let Some(prev) = previous {
                    if date < prev {
                        issues.push(format!("Date out of order: {} after {}", date, prev));
                    }
                }
                previous = Some(date);
            }
        }

        issues
    }
}
