//! Common regex patterns for statement parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Day + month abbreviation: "12 Jan", "5Feb"
    pub static ref DATE_TOKEN: Regex = Regex::new(
        r"^(\d{1,2})\s?([A-Za-z]{3})$"
    ).unwrap();

    // Same, at the start of a longer line
    pub static ref DATE_PREFIX: Regex = Regex::new(
        r"^(\d{1,2})\s?([A-Za-z]{3})\b\s*(.*)$"
    ).unwrap();

    // Whole-token amount: thousands separators optional, two decimals or none
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"^\$?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?$"
    ).unwrap();

    // Whole-token amount with cents, used to split amount cells off text
    pub static ref AMOUNT_CENTS: Regex = Regex::new(
        r"^\$?(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}$"
    ).unwrap();

    // Trailing amount with cents after some text
    pub static ref TRAILING_AMOUNT: Regex = Regex::new(
        r"^(.*\S)\s+(\$?(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})$"
    ).unwrap();

    // First embedded amount on a labelled line, optional sign
    pub static ref EMBEDDED_AMOUNT: Regex = Regex::new(
        r"(-)?\s?\$?((?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2})\b"
    ).unwrap();

    // "3 of 4", "Page 3 of 4"
    pub static ref PAGE_NUMBERING: Regex = Regex::new(
        r"(?i)^(?:page\s+)?\d{1,3}\s+of\s+\d{1,3}$"
    ).unwrap();

    // "Your account number: 01234-5678901"
    pub static ref ACCOUNT_NUMBER: Regex = Regex::new(
        r"(?i)account\s+(?:number|no\.?|#)\s*:?\s*(\d{4,}(?:[\- ]\d{3,})*|\d{2,}(?:[\- ]\d{3,})+)"
    ).unwrap();

    // "From December 10, 2025 to January 9, 2026"
    pub static ref PERIOD: Regex = Regex::new(
        r"(?i)\bfrom\s+([A-Za-z]{3,9}\.?\s*\d{1,2}(?:,\s*\d{4})?)\s+to\s+([A-Za-z]{3,9}\.?\s*\d{1,2}(?:,\s*\d{4})?)"
    ).unwrap();

    // "December 10, 2025", "Jan 9"
    pub static ref LONG_DATE: Regex = Regex::new(
        r"^([A-Za-z]{3,9})\.?\s*(\d{1,2})(?:,\s*(\d{4}))?$"
    ).unwrap();
}
