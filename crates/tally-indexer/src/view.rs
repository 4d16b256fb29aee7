use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_types::{Record, TxId};

/// One fully reconciled history row.
///
/// Exists only when a notification correlated with commit metadata and
/// the authoritative record was fetched. The record fields come from the
/// ledger, never from the notification snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewEntry {
    pub record: Record,
    pub tx: TxId,
    pub commit_number: u64,
    pub commit_timestamp: DateTime<Utc>,
}

/// Presentation order for history entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryOrder {
    /// Highest id first. The natural display order.
    #[default]
    NewestFirst,
    /// Append order, lowest id first.
    Chronological,
}

impl FromStr for HistoryOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "newest" | "newest_first" => Ok(Self::NewestFirst),
            "oldest" | "chronological" => Ok(Self::Chronological),
            other => Err(format!("unknown history order: {other}")),
        }
    }
}

/// An immutable, ordered, de-duplicated snapshot of reconciled history.
///
/// `entries` holds at most one row per record id, sorted by id descending.
/// `ledger_count` is the ledger's count observed at fetch time; it can
/// exceed `entries.len()` when some records were not yet displayable.
/// Views are replaced whole on publish and never mutated, so two views
/// built from identical inputs are identical byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryView {
    pub ledger_count: u64,
    pub entries: Vec<ViewEntry>,
}

impl HistoryView {
    /// The view published before any refresh has succeeded.
    pub fn empty() -> Self {
        Self {
            ledger_count: 0,
            entries: Vec::new(),
        }
    }

    /// Number of displayable entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are displayable.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently appended displayable entry.
    pub fn newest(&self) -> Option<&ViewEntry> {
        self.entries.first()
    }

    /// The oldest displayable entry.
    pub fn oldest(&self) -> Option<&ViewEntry> {
        self.entries.last()
    }

    /// Look up an entry by record id. Binary search over the descending
    /// id order.
    pub fn entry(&self, id: u64) -> Option<&ViewEntry> {
        self.entries
            .binary_search_by(|probe| probe.record.id.cmp(&id).reverse())
            .ok()
            .map(|index| &self.entries[index])
    }

    /// Look up an entry by commit number.
    ///
    /// Best effort: commit numbers are assigned by the medium and carry no
    /// guaranteed relationship to record ids, so this is a linear scan and
    /// record id remains the only stable key.
    pub fn by_commit_number(&self, number: u64) -> Option<&ViewEntry> {
        self.entries.iter().find(|e| e.commit_number == number)
    }

    /// Entries in append order (lowest id first).
    pub fn chronological(&self) -> impl Iterator<Item = &ViewEntry> {
        self.entries.iter().rev()
    }

    /// Entries in the requested presentation order.
    pub fn in_order(&self, order: HistoryOrder) -> Vec<&ViewEntry> {
        match order {
            HistoryOrder::NewestFirst => self.entries.iter().collect(),
            HistoryOrder::Chronological => self.chronological().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::AccountId;

    fn entry(id: u64, commit_number: u64) -> ViewEntry {
        ViewEntry {
            record: Record {
                id,
                name: format!("entry-{id}"),
                sum: id * 100,
                creator: AccountId::from_raw([1; 32]),
            },
            tx: TxId::new(),
            commit_number,
            commit_timestamp: Utc::now(),
        }
    }

    fn view() -> HistoryView {
        HistoryView {
            ledger_count: 3,
            entries: vec![entry(2, 3), entry(1, 2), entry(0, 1)],
        }
    }

    #[test]
    fn empty_view_has_no_entries() {
        let view = HistoryView::empty();
        assert!(view.is_empty());
        assert_eq!(view.ledger_count, 0);
        assert!(view.newest().is_none());
        assert!(view.entry(0).is_none());
    }

    #[test]
    fn newest_and_oldest_respect_descending_order() {
        let view = view();
        assert_eq!(view.newest().unwrap().record.id, 2);
        assert_eq!(view.oldest().unwrap().record.id, 0);
    }

    #[test]
    fn entry_finds_by_id() {
        let view = view();
        for id in 0..3u64 {
            assert_eq!(view.entry(id).unwrap().record.id, id);
        }
        assert!(view.entry(3).is_none());
    }

    #[test]
    fn entry_handles_sparse_ids() {
        // Entries with gaps, as after partial correlation.
        let view = HistoryView {
            ledger_count: 6,
            entries: vec![entry(5, 6), entry(2, 3), entry(0, 1)],
        };
        assert_eq!(view.entry(5).unwrap().record.id, 5);
        assert_eq!(view.entry(2).unwrap().record.id, 2);
        assert_eq!(view.entry(0).unwrap().record.id, 0);
        assert!(view.entry(4).is_none());
        assert!(view.entry(1).is_none());
    }

    #[test]
    fn chronological_reverses_presentation_order() {
        let view = view();
        let ids: Vec<u64> = view.chronological().map(|e| e.record.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn in_order_matches_requested_order() {
        let view = view();

        let newest: Vec<u64> = view
            .in_order(HistoryOrder::NewestFirst)
            .iter()
            .map(|e| e.record.id)
            .collect();
        assert_eq!(newest, vec![2, 1, 0]);

        let oldest: Vec<u64> = view
            .in_order(HistoryOrder::Chronological)
            .iter()
            .map(|e| e.record.id)
            .collect();
        assert_eq!(oldest, vec![0, 1, 2]);
    }

    #[test]
    fn by_commit_number_is_best_effort() {
        let view = view();
        assert_eq!(view.by_commit_number(2).unwrap().record.id, 1);
        assert!(view.by_commit_number(99).is_none());
    }

    #[test]
    fn order_parses_from_query_values() {
        assert_eq!("newest".parse::<HistoryOrder>().unwrap(), HistoryOrder::NewestFirst);
        assert_eq!("oldest".parse::<HistoryOrder>().unwrap(), HistoryOrder::Chronological);
        assert!("sideways".parse::<HistoryOrder>().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let view = view();
        let json = serde_json::to_string(&view).unwrap();
        let parsed: HistoryView = serde_json::from_str(&json).unwrap();
        assert_eq!(view, parsed);
    }
}
