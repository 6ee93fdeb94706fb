// src/domain/match_result.rs
//
// Resolver output
//
// `Resolution` is what gets cached under the `search` namespace: either a
// match or the not-found sentinel (`outcome: None`), plus the transliterated
// form of the title when the Latin-script retry was attempted. Caching the
// sentinel keeps repeated failed lookups off the network.

use serde::{Deserialize, Serialize};

/// A best-effort match from the metadata provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Provider-side identifier for the show
    pub provider_id: i64,

    /// The candidate title that matched
    pub matched_name: String,

    /// Provider's original-language tag for the candidate
    pub original_language_code: String,
}

/// Outcome of resolving one title, match or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Resolution {
    /// `None` is the persisted not-found sentinel
    pub outcome: Option<MatchResult>,

    /// Latin form of the title, when a transliterated retry was attempted
    pub transliterated_name: Option<String>,
}

impl Resolution {
    pub fn found(result: MatchResult, transliterated_name: Option<String>) -> Self {
        Self {
            outcome: Some(result),
            transliterated_name,
        }
    }

    pub fn not_found(transliterated_name: Option<String>) -> Self {
        Self {
            outcome: None,
            transliterated_name,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.outcome.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_sentinel_round_trips_through_json() {
        let sentinel = Resolution::not_found(Some("al bait".to_string()));

        let value = serde_json::to_value(&sentinel).unwrap();
        let back: Resolution = serde_json::from_value(value).unwrap();

        assert!(back.is_not_found());
        assert_eq!(back.transliterated_name.as_deref(), Some("al bait"));
    }
}
