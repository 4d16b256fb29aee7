use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identity::AccountId;

/// One appended ledger entry.
///
/// Records are immutable once appended. The `id` is assigned by the ledger
/// and equals the record's 0-based position in append order, so ids are
/// dense and strictly increasing. `name` and `sum` carry no constraints
/// beyond their types; in particular both may be their empty/zero defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Ledger-assigned sequence number (0-based, dense).
    pub id: u64,
    /// Caller-supplied label. May be empty.
    pub name: String,
    /// Caller-supplied non-negative amount.
    pub sum: u64,
    /// Identity of the submitting party.
    pub creator: AccountId,
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {:?} sum={} by {}",
            self.id,
            self.name,
            self.sum,
            self.creator.short_id()
        )
    }
}
