use tally_stream::{Notification, NotificationFilter, NotificationStream};
use tally_types::Record;

use crate::error::LedgerError;
use crate::traits::LedgerReader;

/// Result of a ledger/stream consistency audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditReport {
    pub record_count: u64,
    pub notification_count: u64,
    pub ids_dense: bool,
    pub notifications_aligned: bool,
    pub violations: Vec<Violation>,
}

impl AuditReport {
    /// Returns `true` if all checks passed.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// A specific inconsistency detected during an audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    pub id: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    SequenceGap,
    CountMismatch,
    MissingNotification,
    NotificationMismatch,
}

/// Cross-checks a ledger against its notification stream.
///
/// Verifies the invariants every conforming ledger upholds: ids are dense
/// and positional, the stream carries exactly one notification per record
/// in append order, and each notification's snapshot agrees with the
/// stored record. Inconsistencies are reported, never panicked on.
pub struct LedgerAudit;

impl LedgerAudit {
    pub async fn check(
        reader: &dyn LedgerReader,
        stream: &dyn NotificationStream,
    ) -> Result<AuditReport, LedgerError> {
        let count = reader.count().await?;
        let mut records: Vec<Record> = Vec::with_capacity(count as usize);
        for id in 0..count {
            records.push(reader.record(id).await?);
        }

        let notifications: Vec<Notification> = stream
            .replay(NotificationFilter::default())
            .await
            .map_err(|e| LedgerError::Unavailable(e.to_string()))?;

        let mut violations = Vec::new();
        let mut ids_dense = true;
        let mut notifications_aligned = true;

        for (position, record) in records.iter().enumerate() {
            let expected = position as u64;
            if record.id != expected {
                ids_dense = false;
                violations.push(Violation {
                    id: record.id,
                    kind: ViolationKind::SequenceGap,
                    description: format!("expected id {expected}, got {}", record.id),
                });
            }

            match notifications.get(position) {
                None => {
                    notifications_aligned = false;
                    violations.push(Violation {
                        id: record.id,
                        kind: ViolationKind::MissingNotification,
                        description: "record has no notification at its position".into(),
                    });
                }
                Some(notification) if !notification.matches_record(record) => {
                    notifications_aligned = false;
                    violations.push(Violation {
                        id: record.id,
                        kind: ViolationKind::NotificationMismatch,
                        description: format!(
                            "notification at position {position} announces id {}, fields disagree",
                            notification.id
                        ),
                    });
                }
                Some(_) => {}
            }
        }

        if notifications.len() as u64 != count {
            notifications_aligned = false;
            violations.push(Violation {
                id: count,
                kind: ViolationKind::CountMismatch,
                description: format!(
                    "{} notifications for {count} records",
                    notifications.len()
                ),
            });
        }

        Ok(AuditReport {
            record_count: count,
            notification_count: notifications.len() as u64,
            ids_dense,
            notifications_aligned,
            violations,
        })
    }
}
