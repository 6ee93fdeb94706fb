// src/domain/not_found.rs
//
// Not-Found Ledger
//
// Persistent record of shows that could not be matched or updated, kept
// for manual follow-up. De-duplicated by show id; the ledger file is
// rewritten on every append so it survives crashes.

use serde::{Deserialize, Serialize};

/// One failed show.
///
/// A record with `error: None` is a clean not-found (the provider had no
/// acceptable candidate); `error: Some(..)` means processing blew up or the
/// backend rejected the update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotFoundRecord {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub category_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub transliterated_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The ledger document as persisted: `{total, shows}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotFoundLedger {
    pub total: usize,
    pub shows: Vec<NotFoundRecord>,
}

impl NotFoundLedger {
    pub fn contains(&self, show_id: i64) -> bool {
        self.shows.iter().any(|record| record.id == show_id)
    }

    /// Append a record unless its show id is already present.
    ///
    /// Returns whether the ledger changed; `total` tracks `shows.len()`.
    pub fn insert(&mut self, record: NotFoundRecord) -> bool {
        if self.contains(record.id) {
            return false;
        }
        self.shows.push(record);
        self.total = self.shows.len();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> NotFoundRecord {
        NotFoundRecord {
            id,
            name: format!("show {}", id),
            category_id: 1,
            category_name: "Drama".to_string(),
            transliterated_name: None,
            error: None,
        }
    }

    #[test]
    fn test_insert_deduplicates_by_show_id() {
        let mut ledger = NotFoundLedger::default();

        assert!(ledger.insert(record(7)));
        assert!(!ledger.insert(record(7)));

        assert_eq!(ledger.total, 1);
        assert_eq!(ledger.shows.len(), 1);
    }

    #[test]
    fn test_total_tracks_show_count() {
        let mut ledger = NotFoundLedger::default();
        ledger.insert(record(1));
        ledger.insert(record(2));
        ledger.insert(record(3));

        assert_eq!(ledger.total, 3);
    }

    #[test]
    fn test_optional_fields_omitted_from_json() {
        let mut ledger = NotFoundLedger::default();
        ledger.insert(record(9));

        let json = serde_json::to_string(&ledger).unwrap();
        assert!(!json.contains("transliterated_name"));
        assert!(!json.contains("error"));
    }
}
