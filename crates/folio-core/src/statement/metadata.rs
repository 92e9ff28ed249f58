//! Statement header and summary values.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use super::rules::patterns::{ACCOUNT_NUMBER, PERIOD};
use super::rules::{PhraseSet, YearMap, first_embedded_amount, parse_long_date};
use crate::models::config::LabelConfig;
use crate::models::fragment::Line;
use crate::models::statement::Period;

/// Summary values found anywhere in the document.
///
/// Every field has a zero value; the names of the fields that were not found
/// are listed in `missing_fields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatementMetadata {
    pub account_number: String,
    pub period: Period,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub total_deposits: Decimal,
    pub total_withdrawals: Decimal,
    pub missing_fields: Vec<String>,
}

impl StatementMetadata {
    /// Month-to-year map for resolving activity dates.
    pub fn year_map(&self) -> YearMap {
        match (self.period.start, self.period.end) {
            (Some(start), Some(end)) => YearMap::from_range(start, end),
            _ => YearMap::default(),
        }
    }
}

/// Finds the account number, period and labelled balances.
#[derive(Debug, Clone)]
pub struct MetadataExtractor {
    opening: PhraseSet,
    closing: PhraseSet,
    deposits: PhraseSet,
    withdrawals: PhraseSet,
}

impl MetadataExtractor {
    pub fn new(labels: &LabelConfig) -> Self {
        Self {
            opening: PhraseSet::new(&labels.opening_balance),
            closing: PhraseSet::new(&labels.closing_balance),
            deposits: PhraseSet::new(&labels.total_deposits),
            withdrawals: PhraseSet::new(&labels.total_withdrawals),
        }
    }

    pub fn extract(&self, lines: &[Line]) -> StatementMetadata {
        let mut missing = Vec::new();

        let account_number = self.account_number(lines);
        if account_number.is_none() {
            missing.push("account_number");
        }

        let period = self.period(lines);
        if period.is_none() {
            missing.push("period");
        }

        let mut labelled = |set: &PhraseSet, name: &'static str| {
            let value = labelled_amount(set, lines);
            if value.is_none() {
                missing.push(name);
            }
            value.unwrap_or_default()
        };
        let opening_balance = labelled(&self.opening, "opening_balance");
        let closing_balance = labelled(&self.closing, "closing_balance");
        let total_deposits = labelled(&self.deposits, "total_deposits").abs();
        let total_withdrawals = labelled(&self.withdrawals, "total_withdrawals").abs();

        debug!("Statement metadata missing: {:?}", missing);

        StatementMetadata {
            account_number: account_number.unwrap_or_default(),
            period: period.unwrap_or_default(),
            opening_balance,
            closing_balance,
            total_deposits,
            total_withdrawals,
            missing_fields: missing.into_iter().map(String::from).collect(),
        }
    }

    fn account_number(&self, lines: &[Line]) -> Option<String> {
        lines.iter().find_map(|l| {
            ACCOUNT_NUMBER
                .captures(&l.text)
                .map(|caps| caps[1].trim().to_string())
        })
    }

    fn period(&self, lines: &[Line]) -> Option<Period> {
        let caps = lines.iter().find_map(|l| PERIOD.captures(&l.text))?;
        let from = caps[1].trim().to_string();
        let to = caps[2].trim().to_string();
        let (start, end) = resolve_period(&from, &to);
        Some(Period {
            from,
            to,
            start,
            end,
        })
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new(&LabelConfig::default())
    }
}

/// First amount printed after one of the labels.
fn labelled_amount(labels: &PhraseSet, lines: &[Line]) -> Option<Decimal> {
    lines.iter().find_map(|line| {
        let lower = line.lower();
        let label = labels.find_in(&lower)?;
        let at = lower.find(label)? + label.len();
        first_embedded_amount(&lower[at..])
    })
}

/// Calendar dates for the period ends.
///
/// A start printed without a year borrows the end's year, minus one when the
/// period crosses a year boundary.
fn resolve_period(from: &str, to: &str) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let (Some((start, start_year)), Some((end, end_year))) =
        (parse_long_date(from), parse_long_date(to))
    else {
        return (None, None);
    };
    let Some(end_year) = end_year else {
        return (None, None);
    };
    let start_year = start_year.unwrap_or(if start.month > end.month {
        end_year - 1
    } else {
        end_year
    });
    (
        NaiveDate::from_ymd_opt(start_year, start.month, start.day),
        NaiveDate::from_ymd_opt(end_year, end.month, end.day),
    )
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn header() -> Vec<Line> {
        Line::from_lines([
            "Your account number: 01234-5678901",
            "From December 10, 2025 to January 9, 2026",
            "Your opening balance on December 10, 2025 $1,000.00",
            "Total deposits into your account + 1,500.00",
            "Total withdrawals from your account - 500.00",
            "Your closing balance on January 9, 2026 = $2,000.00",
        ])
    }

    #[test]
    fn test_extract_all_fields() {
        let metadata = MetadataExtractor::default().extract(&header());
        assert_eq!(metadata.account_number, "01234-5678901");
        assert_eq!(metadata.period.from, "December 10, 2025");
        assert_eq!(metadata.period.to, "January 9, 2026");
        assert_eq!(metadata.period.start, NaiveDate::from_ymd_opt(2025, 12, 10));
        assert_eq!(metadata.period.end, NaiveDate::from_ymd_opt(2026, 1, 9));
        assert_eq!(metadata.opening_balance, dec("1000.00"));
        assert_eq!(metadata.closing_balance, dec("2000.00"));
        assert_eq!(metadata.total_deposits, dec("1500.00"));
        assert_eq!(metadata.total_withdrawals, dec("500.00"));
        assert!(metadata.missing_fields.is_empty());
    }

    #[test]
    fn test_missing_fields_are_listed() {
        let lines = Line::from_lines(["Closing balance 12.00"]);
        let metadata = MetadataExtractor::default().extract(&lines);
        assert_eq!(metadata.closing_balance, dec("12.00"));
        assert_eq!(metadata.opening_balance, Decimal::ZERO);
        assert_eq!(
            metadata.missing_fields,
            vec!["account_number", "period", "opening_balance", "total_deposits", "total_withdrawals"]
        );
    }

    #[test]
    fn test_start_year_inferred_from_end() {
        let (start, end) = resolve_period("Dec 28", "Jan 27, 2026");
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 28));
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 27));
        assert_eq!(resolve_period("Dec 28", "Jan 27"), (None, None));
    }

    #[test]
    fn test_year_map_from_period() {
        let metadata = MetadataExtractor::default().extract(&header());
        let years = metadata.year_map();
        assert_eq!(years.resolve("28 Dec"), NaiveDate::from_ymd_opt(2025, 12, 28));
        assert_eq!(years.resolve("3 Jan"), NaiveDate::from_ymd_opt(2026, 1, 3));
    }
}
