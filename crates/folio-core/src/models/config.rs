//! Configuration structures for the statement pipeline.
//!
//! The parser configuration doubles as the pattern table: every phrase list,
//! bound and threshold the classifier and segmenter consult lives here so a
//! new statement layout can be supported without code changes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::statement::TransactionType;

/// Main configuration for the folio pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    /// Statement parsing configuration.
    pub parser: ParserConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// How amounts on a record are mapped to amount and balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountStrategy {
    /// First amount is the transaction amount, a later one the balance.
    #[default]
    Positional,
    /// Assign by the x position of the Withdrawals | Deposits | Balance columns,
    /// falling back to positional when the header row was not seen.
    Columns,
}

/// Statement parsing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Lines containing any of these start the activity table.
    pub activity_markers: Vec<String>,

    /// Lines containing any of these end the activity table (checked first).
    pub closing_markers: Vec<String>,

    /// End-of-statement markers (checked after closing markers).
    pub end_markers: Vec<String>,

    /// Table header and column-title phrases.
    pub header_phrases: Vec<String>,

    /// Bank boilerplate and legal footer phrases.
    pub footer_phrases: Vec<String>,

    /// Phrase prefixes that start a transaction description.
    pub openers: Vec<String>,

    /// Keywords marking an opener as a transfer (enables reference codes).
    pub transfer_keywords: Vec<String>,

    /// Reference code detection.
    pub reference: ReferenceConfig,

    /// Amount bounds and balance heuristic.
    pub amounts: AmountConfig,

    /// Number of tokens scanned after an opener for its amounts.
    pub lookahead_window: usize,

    /// Text lines absorbed into a description after its amounts were found.
    pub max_continuation_lines: usize,

    /// Amount to column assignment.
    pub amount_strategy: AmountStrategy,

    /// Description phrases meaning money in (checked first).
    pub deposit_patterns: Vec<String>,

    /// Description phrases meaning money out.
    pub withdrawal_patterns: Vec<String>,

    /// Labels for statement metadata lines.
    pub labels: LabelConfig,

    /// Category rules, first match wins.
    pub categories: Vec<CategoryRule>,

    /// Category used when no rule matches.
    pub fallback_category: String,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            activity_markers: strings(&[
                "details of your account activity",
                "account activity details",
                "transaction details",
            ]),
            closing_markers: strings(&["closing balance"]),
            end_markers: strings(&[
                "end of statement",
                "important information about your account",
            ]),
            header_phrases: strings(&[
                "date description",
                "withdrawals ($)",
                "deposits ($)",
                "balance ($)",
                "opening balance",
                "account activity (continued)",
                "details of your account activity - continued",
            ]),
            footer_phrases: strings(&[
                "please check this account statement",
                "protect your pin",
                "stay informed",
                "registered trade-mark",
                "trademark of royal bank",
                "member of cdic",
            ]),
            openers: strings(&[
                "e-transfer",
                "interac e-transfer",
                "transfer received",
                "transfer sent",
                "online banking transfer",
                "online banking payment",
                "online transfer",
                "card purchase",
                "visa debit",
                "contactless interac",
                "interac purchase",
                "payroll",
                "deposit",
                "mobile cheque deposit",
                "withdrawal",
                "atm withdrawal",
                "payment",
                "bill payment",
                "misc payment",
                "interest",
                "investment",
                "to find",
                "monthly fee",
                "service charge",
                "refund",
            ]),
            transfer_keywords: strings(&["transfer", "e-transfer"]),
            reference: ReferenceConfig::default(),
            amounts: AmountConfig::default(),
            lookahead_window: 5,
            max_continuation_lines: 2,
            amount_strategy: AmountStrategy::Positional,
            deposit_patterns: strings(&[
                "received",
                "autodeposit",
                "deposit",
                "payroll",
                "refund",
                "reversal",
                "reversal expired",
                "authorization expired",
                "foreign exchange",
                "interest earned",
            ]),
            withdrawal_patterns: strings(&[
                "sent",
                "purchase",
                "withdrawal",
                "payment",
                "transfer out",
                "investment",
                "to find & save",
                "to find and save",
                "fee",
            ]),
            labels: LabelConfig::default(),
            categories: CategoryRule::defaults(),
            fallback_category: "Other".to_string(),
        }
    }
}

/// Reference code detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    /// Minimum code length.
    pub min_length: usize,

    /// Maximum code length.
    pub max_length: usize,

    /// Require both upper and lower case letters.
    pub require_mixed_case: bool,

    /// Only count codes directly after a transfer-type opener.
    pub require_transfer_context: bool,

    /// Words that are never codes (column headers and the like).
    pub stop_words: Vec<String>,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            min_length: 6,
            max_length: 12,
            require_mixed_case: true,
            require_transfer_context: true,
            stop_words: strings(&[
                "withdrawals",
                "deposits",
                "balance",
                "description",
                "details",
                "account",
                "continued",
            ]),
        }
    }
}

/// Amount plausibility bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AmountConfig {
    /// Smallest value accepted as an amount.
    pub min: Decimal,

    /// Largest value accepted as an amount.
    pub max: Decimal,

    /// Values above this that carry a thousands separator look like balances.
    pub balance_threshold: Decimal,
}

impl Default for AmountConfig {
    fn default() -> Self {
        Self {
            min: Decimal::new(1, 2),
            max: Decimal::new(1_000_000, 0),
            balance_threshold: Decimal::new(1000, 0),
        }
    }
}

/// Labels that introduce summary values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub opening_balance: Vec<String>,
    pub closing_balance: Vec<String>,
    pub total_deposits: Vec<String>,
    pub total_withdrawals: Vec<String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            opening_balance: strings(&["opening balance"]),
            closing_balance: strings(&["closing balance"]),
            total_deposits: strings(&["total deposits"]),
            total_withdrawals: strings(&["total withdrawals"]),
        }
    }
}

/// One category rule: any keyword matching assigns the category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category name.
    pub category: String,

    /// Lower-case substrings matched against the description.
    pub keywords: Vec<String>,

    /// Restrict the rule to one direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<TransactionType>,
}

impl CategoryRule {
    pub fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: strings(keywords),
            direction: None,
        }
    }

    /// Restrict the rule to one direction.
    pub fn for_direction(mut self, direction: TransactionType) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Default rule table.
    pub fn defaults() -> Vec<Self> {
        let bank_transfers = ["online banking transfer", "online transfer to deposit"];
        vec![
            Self::new("Transfers Out", &bank_transfers).for_direction(TransactionType::Withdrawal),
            Self::new("Transfers In", &bank_transfers).for_direction(TransactionType::Deposit),
            Self::new("Income", &["payroll deposit", "payrolldeposit"]),
            Self::new("Investments", &["ws investments", "investment ws", "wealthsimple"]),
            Self::new("Savings", &["find & save", "find and save"]),
            Self::new("Rent", &["landlord", "rent payment"]),
            Self::new(
                "Groceries",
                &["walmart", "wal-mart", "no frills", "loblaws", "metro", "sobeys"],
            ),
            Self::new("Rideshare", &["uber", "lyft"]),
            Self::new(
                "Subscriptions",
                &["apple.com/bill", "audible", "amazon prime", "netflix", "spotify"],
            ),
            Self::new("Shopping", &["amazon", "amzn", "uniqlo", "dollarama"]),
            Self::new("Food & Dining", &["restaurant", "cafe", "pizza", "tim hortons"]),
            Self::new("Entertainment", &["cineplex", "skywheel"]),
            Self::new("Health & Beauty", &["shoppers drug", "pharmacy"]),
            Self::new("Transit", &["presto", "ttc"]),
            Self::new("Government / Fees", &["immigration", "service charge", "monthly fee"]),
            Self::new("Transfers Out", &["e-transfer sent"]),
            Self::new("Transfers In", &["e-transfer received", "autodeposit"]),
            Self::new(
                "Refunds",
                &["refund", "auth reversal", "visa debit reversal", "reversal expired"],
            ),
        ]
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Maximum pages to read (0 = unlimited).
    pub max_pages: usize,

    /// Fall back to plain text extraction when no positioned text is found.
    pub text_fallback: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            max_pages: 0,
            text_fallback: true,
        }
    }
}

impl FolioConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
