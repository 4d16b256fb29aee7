use serde::{Deserialize, Serialize};

use tally_types::{AccountId, Record, TxId};

/// Announcement of a newly appended ledger record.
///
/// Carries a snapshot of the record's fields at append time plus the
/// identity of the transaction that performed the append. Exactly one
/// notification exists per successful append, and notifications are
/// observable in append order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Ledger-assigned id of the announced record.
    pub id: u64,
    /// Snapshot of the record's name.
    pub name: String,
    /// Snapshot of the record's sum.
    pub sum: u64,
    /// Snapshot of the record's creator.
    pub creator: AccountId,
    /// The transaction that delivered the append. Assigned by the medium,
    /// never by the ledger.
    pub tx: TxId,
}

impl Notification {
    /// Build the announcement for a freshly appended record.
    pub fn announce(record: &Record, tx: TxId) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            sum: record.sum,
            creator: record.creator.clone(),
            tx,
        }
    }

    /// Returns `true` if this notification's snapshot agrees with the
    /// given record field-for-field.
    pub fn matches_record(&self, record: &Record) -> bool {
        self.id == record.id
            && self.name == record.name
            && self.sum == record.sum
            && self.creator == record.creator
    }
}

/// Filter for replaying or subscribing to a subset of notifications.
#[derive(Clone, Debug, Default)]
pub struct NotificationFilter {
    /// If set, only notifications with `id >= from_id` are delivered.
    pub from_id: Option<u64>,
    /// If set, only notifications for appends by this account are delivered.
    pub creator: Option<AccountId>,
}

impl NotificationFilter {
    /// Returns `true` if the given notification matches this filter.
    pub fn matches(&self, notification: &Notification) -> bool {
        if let Some(from_id) = self.from_id {
            if notification.id < from_id {
                return false;
            }
        }
        if let Some(ref creator) = self.creator {
            if &notification.creator != creator {
                return false;
            }
        }
        true
    }
}
