//! Spending categories by description keyword.

use crate::models::config::CategoryRule;
use crate::models::statement::TransactionType;

/// Ordered category table; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
    fallback: String,
}

impl Categorizer {
    pub fn new(rules: &[CategoryRule], fallback: impl Into<String>) -> Self {
        let rules = rules
            .iter()
            .map(|r| CategoryRule {
                category: r.category.clone(),
                keywords: r.keywords.iter().map(|k| k.to_lowercase()).collect(),
                direction: r.direction,
            })
            .collect();
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Category for a description and direction.
    pub fn categorize(&self, description: &str, direction: TransactionType) -> &str {
        let lower = description.to_lowercase();
        self.rules
            .iter()
            .filter(|r| r.direction.is_none_or(|d| d == direction))
            .find(|r| r.keywords.iter().any(|k| lower.contains(k.as_str())))
            .map(|r| r.category.as_str())
            .unwrap_or(&self.fallback)
    }
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(&CategoryRule::defaults(), "Other")
    }
}
