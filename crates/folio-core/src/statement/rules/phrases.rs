//! Phrase tables: transaction openers, noise and direction keywords.

use tracing::debug;

use crate::models::statement::TransactionType;

/// Case-insensitive phrase list.
#[derive(Debug, Clone, Default)]
pub struct PhraseSet {
    phrases: Vec<String>,
}

impl PhraseSet {
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Self {
        Self {
            phrases: phrases
                .iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    /// First phrase contained anywhere in the text.
    pub fn find_in(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.phrases
            .iter()
            .find(|p| lower.contains(p.as_str()))
            .map(String::as_str)
    }

    pub fn contained_in(&self, text: &str) -> bool {
        self.find_in(text).is_some()
    }

    /// Longest phrase the text starts with, ending on a word boundary.
    ///
    /// Whatever follows the phrase (card suffixes, codes, merchant text) is
    /// ignored, so "Visa Debit purchase - 5432" matches "visa debit".
    pub fn prefix_of(&self, text: &str) -> Option<&str> {
        let lower = text.trim_start().to_lowercase();
        self.phrases
            .iter()
            .filter(|p| {
                lower.starts_with(p.as_str())
                    && lower[p.len()..]
                        .chars()
                        .next()
                        .is_none_or(|c| !c.is_alphanumeric())
            })
            .max_by_key(|p| p.len())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.phrases.iter().map(String::as_str)
    }
}

/// Ordered deposit/withdrawal keyword lists.
#[derive(Debug, Clone, Default)]
pub struct DirectionRules {
    deposit: PhraseSet,
    withdrawal: PhraseSet,
}

impl DirectionRules {
    pub fn new<S: AsRef<str>>(deposit: &[S], withdrawal: &[S]) -> Self {
        Self {
            deposit: PhraseSet::new(deposit),
            withdrawal: PhraseSet::new(withdrawal),
        }
    }

    /// Direction of a description.
    ///
    /// Deposit phrases are checked before withdrawal phrases, so a description
    /// matching both is a deposit. No match at all defaults to a withdrawal.
    pub fn classify(&self, description: &str) -> TransactionType {
        if let Some(phrase) = self.deposit.find_in(description) {
            debug!("{:?} is a deposit (matched {:?})", description, phrase);
            return TransactionType::Deposit;
        }
        if self.withdrawal.find_in(description).is_none() {
            debug!("No direction phrase in {:?}, defaulting to withdrawal", description);
        }
        TransactionType::Withdrawal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_respects_word_boundary() {
        let openers = PhraseSet::new(&["deposit", "visa debit", "visa"]);
        assert_eq!(openers.prefix_of("Visa Debit purchase - 5432"), Some("visa debit"));
        assert_eq!(openers.prefix_of("Deposit 123"), Some("deposit"));
        assert_eq!(openers.prefix_of("Depository fee"), None);
        assert_eq!(openers.prefix_of("WALMART STORE"), None);
    }

    #[test]
    fn test_deposit_wins_ties() {
        let rules = DirectionRules::new(&["refund"], &["purchase"]);
        assert_eq!(rules.classify("Visa Debit purchase refund"), TransactionType::Deposit);
        assert_eq!(rules.classify("Visa Debit purchase"), TransactionType::Withdrawal);
    }

    #[test]
    fn test_unknown_defaults_to_withdrawal() {
        let rules = DirectionRules::new(&["received"], &["sent"]);
        assert_eq!(rules.classify("Mystery line"), TransactionType::Withdrawal);
    }
}
