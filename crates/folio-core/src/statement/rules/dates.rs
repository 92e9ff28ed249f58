//! Statement date tokens and calendar resolution.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use super::patterns::{DATE_PREFIX, DATE_TOKEN, LONG_DATE};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Month number (1-12) from a name or its three-letter abbreviation.
pub fn month_number(name: &str) -> Option<u32> {
    let abbr = name.get(..3)?;
    MONTHS
        .iter()
        .position(|m| m.eq_ignore_ascii_case(abbr))
        .map(|i| i as u32 + 1)
}

/// A day + month token such as "12 Jan".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayMonth {
    pub day: u32,
    pub month: u32,
}

impl DayMonth {
    fn from_parts(day: &str, month: &str) -> Option<Self> {
        let day: u32 = day.parse().ok()?;
        let month = month_number(month)?;
        if !(1..=31).contains(&day) {
            return None;
        }
        Some(Self { day, month })
    }

    /// Canonical form: "12 Jan".
    pub fn label(&self) -> String {
        format!("{} {}", self.day, MONTHS[(self.month - 1) as usize])
    }
}

/// Parse a token that is exactly a statement date.
pub fn parse_date_token(text: &str) -> Option<DayMonth> {
    let caps = DATE_TOKEN.captures(text.trim())?;
    DayMonth::from_parts(&caps[1], &caps[2])
}

/// Split a leading date off a line: "12 Jan Payroll deposit" -> ("12 Jan", "Payroll deposit").
pub fn split_date_prefix(text: &str) -> Option<(DayMonth, &str)> {
    let caps = DATE_PREFIX.captures(text.trim())?;
    let date = DayMonth::from_parts(&caps[1], &caps[2])?;
    let rest = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    Some((date, rest))
}

/// Parse a long-form date such as "December 10, 2025".
///
/// Returns the month/day and the year when one is printed.
pub fn parse_long_date(text: &str) -> Option<(DayMonth, Option<i32>)> {
    let caps = LONG_DATE.captures(text.trim())?;
    let date = DayMonth::from_parts(&caps[2], &caps[1])?;
    let year = caps.get(3).and_then(|m| m.as_str().parse().ok());
    Some((date, year))
}

/// Maps statement months to calendar years.
///
/// Built from the statement period so that a December-to-January statement
/// resolves "28 Dec" and "3 Jan" into different years.
#[derive(Debug, Clone, Default)]
pub struct YearMap {
    years: HashMap<u32, i32>,
}

impl YearMap {
    /// Cover every month from `start` to `end` inclusive.
    pub fn from_range(start: NaiveDate, end: NaiveDate) -> Self {
        let mut years = HashMap::new();
        if end < start {
            return Self { years };
        }
        let (mut year, mut month) = (start.year(), start.month());
        // A statement never spans more than a year of months.
        for _ in 0..12 {
            years.insert(month, year);
            if (year, month) == (end.year(), end.month()) {
                break;
            }
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        Self { years }
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Calendar date for a statement date token.
    pub fn resolve(&self, token: &str) -> Option<NaiveDate> {
        let date = parse_date_token(token)?;
        let year = *self.years.get(&date.month)?;
        NaiveDate::from_ymd_opt(year, date.month, date.day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_token() {
        assert_eq!(parse_date_token("12 Jan"), Some(DayMonth { day: 12, month: 1 }));
        assert_eq!(parse_date_token("5Feb"), Some(DayMonth { day: 5, month: 2 }));
        assert_eq!(parse_date_token("12 Foo"), None);
        assert_eq!(parse_date_token("45 Jan"), None);
        assert_eq!(parse_date_token("12 January"), None);
    }

    #[test]
    fn test_label_is_canonical() {
        assert_eq!(parse_date_token("10dec").unwrap().label(), "10 Dec");
    }

    #[test]
    fn test_split_date_prefix() {
        let (date, rest) = split_date_prefix("12 Jan e-Transfer sent").unwrap();
        assert_eq!(date.label(), "12 Jan");
        assert_eq!(rest, "e-Transfer sent");
        assert!(split_date_prefix("1 ATM withdrawal").is_none());
        assert!(split_date_prefix("3 of 4").is_none());
    }

    #[test]
    fn test_year_map_crosses_year_end() {
        let start = NaiveDate::from_ymd_opt(2025, 12, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
        let map = YearMap::from_range(start, end);

        assert_eq!(map.resolve("28 Dec"), NaiveDate::from_ymd_opt(2025, 12, 28));
        assert_eq!(map.resolve("3 Jan"), NaiveDate::from_ymd_opt(2026, 1, 3));
        assert_eq!(map.resolve("3 Mar"), None);
    }

    #[test]
    fn test_parse_long_date() {
        let (date, year) = parse_long_date("December 10, 2025").unwrap();
        assert_eq!(date, DayMonth { day: 10, month: 12 });
        assert_eq!(year, Some(2025));
        assert_eq!(parse_long_date("Jan 9").unwrap().1, None);
    }
}
