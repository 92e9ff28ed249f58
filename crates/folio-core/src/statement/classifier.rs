//! Token classification.
//!
//! Every rule is a pure predicate over one token, plus the token before it for
//! the context-sensitive reference-code rule. A token may satisfy several
//! rules; [`TokenClassifier::primary`] resolves them by a fixed precedence.

use std::collections::BTreeSet;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::rules::patterns::PAGE_NUMBERING;
use super::rules::{AmountRules, PhraseSet, ReferenceRules, parse_date_token};
use crate::models::config::ParserConfig;

/// Semantic category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenClass {
    HeaderNoise,
    FooterNoise,
    Date,
    TransactionOpener,
    BalanceAmount,
    Amount,
    ReferenceCode,
    Unclassified,
}

impl TokenClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HeaderNoise => "header_noise",
            Self::FooterNoise => "footer_noise",
            Self::Date => "date",
            Self::TransactionOpener => "opener",
            Self::BalanceAmount => "balance_amount",
            Self::Amount => "amount",
            Self::ReferenceCode => "reference_code",
            Self::Unclassified => "unclassified",
        }
    }

    pub fn is_amount(self) -> bool {
        matches!(self, Self::Amount | Self::BalanceAmount)
    }

    pub fn is_noise(self) -> bool {
        matches!(self, Self::HeaderNoise | Self::FooterNoise)
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Table boundary markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    /// Start of the activity table.
    Activity,
    /// Closing balance line.
    Closing,
    /// End of statement.
    End,
}

/// Classifier built from the parser pattern table.
#[derive(Debug, Clone)]
pub struct TokenClassifier {
    openers: PhraseSet,
    transfer_keywords: PhraseSet,
    header: PhraseSet,
    footer: PhraseSet,
    activity_markers: PhraseSet,
    closing_markers: PhraseSet,
    end_markers: PhraseSet,
    reference: ReferenceRules,
    amounts: AmountRules,
}

impl TokenClassifier {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            openers: PhraseSet::new(&config.openers),
            transfer_keywords: PhraseSet::new(&config.transfer_keywords),
            header: PhraseSet::new(&config.header_phrases),
            footer: PhraseSet::new(&config.footer_phrases),
            activity_markers: PhraseSet::new(&config.activity_markers),
            closing_markers: PhraseSet::new(&config.closing_markers),
            end_markers: PhraseSet::new(&config.end_markers),
            reference: ReferenceRules::new(&config.reference),
            amounts: AmountRules::new(&config.amounts),
        }
    }

    /// All rules the token satisfies; `Unclassified` when none do.
    pub fn classify(&self, text: &str, previous: Option<&str>) -> BTreeSet<TokenClass> {
        let text = text.trim();
        let mut classes = BTreeSet::new();

        if self.is_header_noise(text) {
            classes.insert(TokenClass::HeaderNoise);
        }
        if self.is_footer_noise(text) {
            classes.insert(TokenClass::FooterNoise);
        }
        if self.is_date(text) {
            classes.insert(TokenClass::Date);
        }
        if self.is_opener(text) {
            classes.insert(TokenClass::TransactionOpener);
        }
        if self.amount(text).is_some() {
            classes.insert(TokenClass::Amount);
            if self.amounts.is_balance_like(text) {
                classes.insert(TokenClass::BalanceAmount);
            }
        }
        if self.is_reference_code(text, previous) {
            classes.insert(TokenClass::ReferenceCode);
        }
        if classes.is_empty() {
            classes.insert(TokenClass::Unclassified);
        }

        trace!("{:?} -> {:?}", text, classes);
        classes
    }

    /// Highest-precedence class: noise, date, opener, balance, amount,
    /// reference code, then unclassified.
    pub fn primary(&self, text: &str, previous: Option<&str>) -> TokenClass {
        self.classify(text, previous)
            .into_iter()
            .next()
            .unwrap_or(TokenClass::Unclassified)
    }

    pub fn is_date(&self, text: &str) -> bool {
        parse_date_token(text).is_some()
    }

    pub fn is_opener(&self, text: &str) -> bool {
        self.openers.prefix_of(text).is_some()
    }

    /// An opener naming a transfer, after which reference codes are expected.
    pub fn is_transfer_opener(&self, text: &str) -> bool {
        self.is_opener(text) && self.transfer_keywords.contained_in(text)
    }

    pub fn is_reference_code(&self, text: &str, previous: Option<&str>) -> bool {
        let after_transfer = previous.is_some_and(|p| self.is_transfer_opener(p));
        self.reference.matches(text.trim(), after_transfer)
    }

    /// Value of a plausible transaction amount.
    pub fn amount(&self, text: &str) -> Option<Decimal> {
        self.amounts.amount(text)
    }

    pub fn is_header_noise(&self, text: &str) -> bool {
        self.header.contained_in(text)
    }

    pub fn is_footer_noise(&self, text: &str) -> bool {
        PAGE_NUMBERING.is_match(text.trim()) || self.footer.contained_in(text)
    }

    pub fn is_activity_marker(&self, text: &str) -> bool {
        self.activity_markers.contained_in(text)
    }

    pub fn is_closing_marker(&self, text: &str) -> bool {
        self.closing_markers.contained_in(text)
    }

    pub fn is_end_marker(&self, text: &str) -> bool {
        self.end_markers.contained_in(text)
    }

    /// Marker on a line, closing before end before activity.
    pub fn marker(&self, text: &str) -> Option<Marker> {
        if self.is_closing_marker(text) {
            Some(Marker::Closing)
        } else if self.is_end_marker(text) {
            Some(Marker::End)
        } else if self.is_activity_marker(text) {
            Some(Marker::Activity)
        } else {
            None
        }
    }

    /// Configured activity markers, for error reporting.
    pub fn activity_marker_phrases(&self) -> Vec<String> {
        self.activity_markers.iter().map(str::to_string).collect()
    }
}

impl Default for TokenClassifier {
    fn default() -> Self {
        Self::new(&ParserConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_basic_tokens() {
        let c = TokenClassifier::default();
        assert_eq!(c.primary("12 Jan", None), TokenClass::Date);
        assert_eq!(c.primary("e-Transfer sent", None), TokenClass::TransactionOpener);
        assert_eq!(c.primary("Visa Debit purchase - 5432", None), TokenClass::TransactionOpener);
        assert_eq!(c.primary("50.00", None), TokenClass::Amount);
        assert_eq!(c.primary("AMAZON.CA", None), TokenClass::Unclassified);
    }

    #[test]
    fn test_balance_amount_is_also_amount() {
        let c = TokenClassifier::default();
        let classes = c.classify("2,345.67", None);
        assert!(classes.contains(&TokenClass::Amount));
        assert!(classes.contains(&TokenClass::BalanceAmount));
        assert_eq!(c.primary("2,345.67", None), TokenClass::BalanceAmount);
    }

    #[test]
    fn test_reference_code_needs_transfer_context() {
        let c = TokenClassifier::default();
        assert_eq!(
            c.primary("Xk29Qa7", Some("e-Transfer received")),
            TokenClass::ReferenceCode
        );
        assert_eq!(c.primary("Xk29Qa7", Some("Visa Debit purchase")), TokenClass::Unclassified);
        assert_eq!(c.primary("Xk29Qa7", None), TokenClass::Unclassified);
    }

    #[test]
    fn test_noise() {
        let c = TokenClassifier::default();
        assert_eq!(
            c.primary("Date Description Withdrawals ($) Deposits ($) Balance ($)", None),
            TokenClass::HeaderNoise
        );
        assert_eq!(c.primary("2 of 4", None), TokenClass::FooterNoise);
        assert_eq!(
            c.primary("Please check this Account Statement without delay", None),
            TokenClass::FooterNoise
        );
    }

    #[test]
    fn test_out_of_range_numbers_are_not_amounts() {
        let c = TokenClassifier::default();
        assert_eq!(c.primary("0.00", None), TokenClass::Unclassified);
        assert_eq!(c.primary("123456789", None), TokenClass::Unclassified);
    }

    #[test]
    fn test_markers() {
        let c = TokenClassifier::default();
        assert_eq!(c.marker("Details of your account activity"), Some(Marker::Activity));
        assert_eq!(c.marker("Closing Balance $2,000.00"), Some(Marker::Closing));
        assert_eq!(c.marker("Visa Debit purchase"), None);
    }
}
