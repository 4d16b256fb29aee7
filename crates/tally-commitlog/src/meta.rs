use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a transaction has been durably committed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommitStatus {
    /// The transaction is final.
    Committed,
    /// The transaction is known but not yet final.
    Pending,
}

impl fmt::Display for CommitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Committed => write!(f, "committed"),
            Self::Pending => write!(f, "pending"),
        }
    }
}

/// Facts about the transaction that performed an append.
///
/// Commit numbers are assigned monotonically by the medium, starting at 1;
/// 0 never names a real commit. The timestamp is the commit wall-clock
/// time, not the append time, and carries no ordering guarantee relative
/// to ledger ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMeta {
    pub number: u64,
    pub timestamp: DateTime<Utc>,
    pub status: CommitStatus,
}

impl CommitMeta {
    /// Returns `true` if the transaction is final.
    pub fn is_committed(&self) -> bool {
        self.status == CommitStatus::Committed
    }
}
