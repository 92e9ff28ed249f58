//! Transfer reference codes ("Xk29Qa7").

use super::amounts::amount_shape;
use super::dates::parse_date_token;
use super::phrases::PhraseSet;
use crate::models::config::ReferenceConfig;

/// Reference code detection.
#[derive(Debug, Clone)]
pub struct ReferenceRules {
    min_length: usize,
    max_length: usize,
    require_mixed_case: bool,
    require_transfer_context: bool,
    stop_words: PhraseSet,
}

impl ReferenceRules {
    pub fn new(config: &ReferenceConfig) -> Self {
        Self {
            min_length: config.min_length,
            max_length: config.max_length,
            require_mixed_case: config.require_mixed_case,
            require_transfer_context: config.require_transfer_context,
            stop_words: PhraseSet::new(&config.stop_words),
        }
    }

    /// Whether the token alone has the shape of a reference code.
    pub fn matches_shape(&self, token: &str) -> bool {
        let len = token.chars().count();
        if len < self.min_length || len > self.max_length {
            return false;
        }
        if !token.chars().all(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if parse_date_token(token).is_some() || amount_shape(token).is_some() {
            return false;
        }
        let lower = token.to_ascii_lowercase();
        if self.stop_words.iter().any(|w| w == lower) {
            return false;
        }
        if self.require_mixed_case {
            let upper = token.chars().any(|c| c.is_ascii_uppercase());
            let lower = token.chars().any(|c| c.is_ascii_lowercase());
            if !(upper && lower) {
                return false;
            }
        }
        true
    }

    /// Whether the token is a reference code given the token before it.
    pub fn matches(&self, token: &str, previous_is_transfer: bool) -> bool {
        if self.require_transfer_context && !previous_is_transfer {
            return false;
        }
        self.matches_shape(token)
    }
}

impl Default for ReferenceRules {
    fn default() -> Self {
        Self::new(&ReferenceConfig::default())
    }
}
