//! Monetary amount recognition.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::trace;

use super::patterns::{AMOUNT_CENTS, AMOUNT_TOKEN, EMBEDDED_AMOUNT, TRAILING_AMOUNT};
use crate::models::config::AmountConfig;

/// Parse a statement-formatted amount ("1,234.56", "$20.00").
///
/// Returns `None` for anything that does not parse as a number.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    match Decimal::from_str(&cleaned) {
        Ok(value) => Some(value),
        Err(e) => {
            trace!("Malformed number {:?}: {}", s, e);
            None
        }
    }
}

/// Whether the token has an amount shape with cents, regardless of value.
pub fn has_cents_shape(token: &str) -> bool {
    AMOUNT_CENTS.is_match(token.trim())
}

/// Value of a token shaped like an amount, before any range check.
pub fn amount_shape(token: &str) -> Option<Decimal> {
    let token = token.trim();
    if !AMOUNT_TOKEN.is_match(token) {
        return None;
    }
    parse_amount(token)
}

/// Split trailing amounts off a text segment.
///
/// "Visa Debit purchase 20.00 880.00" -> ("Visa Debit purchase", ["20.00", "880.00"]).
/// Only amounts with cents are split so card suffixes and store numbers stay in the text.
pub fn split_trailing_amounts(text: &str) -> (&str, Vec<&str>) {
    let mut rest = text.trim();
    let mut amounts = Vec::new();

    while let Some(caps) = TRAILING_AMOUNT.captures(rest) {
        let (Some(head), Some(amount)) = (caps.get(1), caps.get(2)) else {
            break;
        };
        amounts.push(amount.as_str());
        rest = head.as_str();
        if amounts.len() == 3 {
            break;
        }
    }

    amounts.reverse();
    (rest, amounts)
}

/// First amount embedded anywhere in a line, keeping a leading minus sign.
pub fn first_embedded_amount(text: &str) -> Option<Decimal> {
    EMBEDDED_AMOUNT.captures_iter(text).find_map(|caps| {
        let value = parse_amount(&caps[2])?;
        Some(if caps.get(1).is_some() { -value } else { value })
    })
}

/// Amount classification rules.
#[derive(Debug, Clone)]
pub struct AmountRules {
    min: Decimal,
    max: Decimal,
    balance_threshold: Decimal,
}

impl AmountRules {
    pub fn new(config: &AmountConfig) -> Self {
        Self {
            min: config.min,
            max: config.max,
            balance_threshold: config.balance_threshold,
        }
    }

    /// Value of the token when it is a plausible transaction amount.
    ///
    /// Near-zero values and values above the ceiling are rejected so account
    /// and reference numbers are not mistaken for money.
    pub fn amount(&self, token: &str) -> Option<Decimal> {
        amount_shape(token).filter(|v| *v >= self.min && *v <= self.max)
    }

    /// Whether the token looks like a running balance: a plausible amount
    /// above the threshold that is printed with a thousands separator.
    ///
    /// Large transactions printed the same way are misread as balances.
    pub fn is_balance_like(&self, token: &str) -> bool {
        self.amount(token)
            .is_some_and(|v| v > self.balance_threshold && token.contains(','))
    }
}

impl Default for AmountRules {
    fn default() -> Self {
        Self::new(&AmountConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("$20.00"), Some(dec("20.00")));
        assert_eq!(parse_amount("12.3.4"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_amount_bounds() {
        let rules = AmountRules::default();
        assert_eq!(rules.amount("50.00"), Some(dec("50.00")));
        assert_eq!(rules.amount("0.00"), None);
        assert_eq!(rules.amount("12345678"), None);
        assert_eq!(rules.amount("ABC123"), None);
    }

    #[test]
    fn test_balance_heuristic() {
        let rules = AmountRules::default();
        assert!(rules.is_balance_like("1,234.56"));
        assert!(!rules.is_balance_like("1234.56"));
        assert!(!rules.is_balance_like("900.00"));
    }

    #[test]
    fn test_split_trailing_amounts() {
        let (text, amounts) = split_trailing_amounts("Visa Debit purchase 20.00 880.00");
        assert_eq!(text, "Visa Debit purchase");
        assert_eq!(amounts, vec!["20.00", "880.00"]);

        let (text, amounts) = split_trailing_amounts("Contactless Interac purchase - 1234");
        assert_eq!(text, "Contactless Interac purchase - 1234");
        assert!(amounts.is_empty());
    }

    #[test]
    fn test_first_embedded_amount() {
        assert_eq!(
            first_embedded_amount("Your closing balance on January 9, 2026 = $1,234.56"),
            Some(dec("1234.56"))
        );
        assert_eq!(
            first_embedded_amount("Opening balance -$12.50"),
            Some(dec("-12.50"))
        );
        assert_eq!(first_embedded_amount("Opening balance"), None);
    }
}
