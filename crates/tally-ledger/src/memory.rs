use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use tally_stream::NotificationJournal;
use tally_types::Record;

use crate::error::LedgerError;
use crate::traits::{LedgerReader, LedgerWriter, Submission};

/// In-memory ledger implementation for tests, local demos, and embedding.
///
/// Records live in a single append-order vector guarded by a `RwLock`, so
/// a record's id doubles as its position. Every append announces itself
/// on the [`NotificationJournal`] while the write lock is still held:
/// readers going through the ledger can never observe a record without
/// its notification or vice versa.
pub struct InMemoryLedger {
    journal: Arc<NotificationJournal>,
    inner: RwLock<Vec<Record>>,
}

impl InMemoryLedger {
    /// Create an empty ledger announcing onto the given journal.
    pub fn new(journal: Arc<NotificationJournal>) -> Self {
        Self {
            journal,
            inner: RwLock::new(Vec::new()),
        }
    }

    /// The journal this ledger announces onto.
    pub fn journal(&self) -> &Arc<NotificationJournal> {
        &self.journal
    }
}

#[async_trait]
impl LedgerWriter for InMemoryLedger {
    async fn append(&self, submission: Submission) -> Result<Record, LedgerError> {
        let mut records = self
            .inner
            .write()
            .map_err(|_| LedgerError::Unavailable("ledger write lock poisoned".into()))?;

        let record = Record {
            id: records.len() as u64,
            name: submission.name,
            sum: submission.sum,
            creator: submission.creator,
        };

        // Store and announce under one write-lock scope. If the
        // announcement fails, the push is rolled back so the two stay
        // all-or-nothing.
        records.push(record.clone());
        if let Err(e) = self.journal.publish(&record, submission.tx) {
            records.pop();
            return Err(LedgerError::Unavailable(e.to_string()));
        }

        debug!(id = record.id, tx = %submission.tx, "record appended");
        Ok(record)
    }
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn record(&self, id: u64) -> Result<Record, LedgerError> {
        let records = self
            .inner
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger read lock poisoned".into()))?;

        let count = records.len() as u64;
        records
            .get(id as usize)
            .cloned()
            .ok_or(LedgerError::OutOfRange { id, count })
    }

    async fn count(&self) -> Result<u64, LedgerError> {
        let records = self
            .inner
            .read()
            .map_err(|_| LedgerError::Unavailable("ledger read lock poisoned".into()))?;
        Ok(records.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_stream::{NotificationFilter, NotificationStream};
    use tally_types::{AccountId, TxId};

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::new(Arc::new(NotificationJournal::default()))
    }

    fn submission(name: &str, sum: u64) -> Submission {
        Submission {
            tx: TxId::new(),
            creator: AccountId::from_raw([1; 32]),
            name: name.into(),
            sum,
        }
    }

    #[tokio::test]
    async fn append_assigns_dense_ids() {
        let ledger = ledger();

        for expected in 0..5u64 {
            let record = ledger.append(submission("entry", 1)).await.unwrap();
            assert_eq!(record.id, expected);
        }
        assert_eq!(ledger.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn record_returns_stored_fields_unchanged() {
        let ledger = ledger();
        let creator = AccountId::from_raw([9; 32]);

        ledger
            .append(Submission {
                tx: TxId::new(),
                creator: creator.clone(),
                name: "Test Name".into(),
                sum: 100,
            })
            .await
            .unwrap();

        let record = ledger.record(0).await.unwrap();
        assert_eq!(record.id, 0);
        assert_eq!(record.name, "Test Name");
        assert_eq!(record.sum, 100);
        assert_eq!(record.creator, creator);
        assert_eq!(ledger.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn lookup_past_count_is_out_of_range() {
        let ledger = ledger();

        let err = ledger.record(0).await.unwrap_err();
        assert_eq!(err, LedgerError::OutOfRange { id: 0, count: 0 });

        ledger.append(submission("only", 1)).await.unwrap();

        let err = ledger.record(1).await.unwrap_err();
        assert_eq!(err, LedgerError::OutOfRange { id: 1, count: 1 });

        let err = ledger.record(u64::MAX).await.unwrap_err();
        assert_eq!(
            err,
            LedgerError::OutOfRange {
                id: u64::MAX,
                count: 1
            }
        );
    }

    #[tokio::test]
    async fn name_only_defaults_sum_to_zero() {
        let ledger = ledger();
        let record = ledger
            .append_name_only(TxId::new(), AccountId::from_raw([1; 32]), "named".into())
            .await
            .unwrap();
        assert_eq!(record.name, "named");
        assert_eq!(record.sum, 0);
    }

    #[tokio::test]
    async fn sum_of_two_defaults_name_to_empty() {
        let ledger = ledger();
        let record = ledger
            .append_sum_of_two(TxId::new(), AccountId::from_raw([1; 32]), 50, 50)
            .await
            .unwrap();
        assert_eq!(record.name, "");
        assert_eq!(record.sum, 100);
    }

    #[tokio::test]
    async fn overflowing_sum_is_rejected_before_storage() {
        let ledger = ledger();
        let err = ledger
            .append_sum_of_two(TxId::new(), AccountId::from_raw([1; 32]), u64::MAX, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Rejected { .. }));

        // Nothing stored, nothing announced.
        assert_eq!(ledger.count().await.unwrap(), 0);
        assert!(ledger.journal().is_empty());
    }

    #[tokio::test]
    async fn every_append_announces_exactly_once() {
        let ledger = ledger();
        let tx = TxId::new();

        let record = ledger
            .append(Submission {
                tx,
                creator: AccountId::from_raw([2; 32]),
                name: "announced".into(),
                sum: 7,
            })
            .await
            .unwrap();

        let notifications = ledger
            .journal()
            .replay(NotificationFilter::default())
            .await
            .unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].tx, tx);
        assert!(notifications[0].matches_record(&record));
    }

    #[tokio::test]
    async fn notifications_follow_append_order() {
        let ledger = ledger();

        for i in 0..10u64 {
            ledger.append(submission(&format!("n{i}"), i)).await.unwrap();
        }

        let notifications = ledger
            .journal()
            .replay(NotificationFilter::default())
            .await
            .unwrap();
        assert_eq!(notifications.len(), 10);
        for (position, notification) in notifications.iter().enumerate() {
            assert_eq!(notification.id, position as u64);
        }
    }

    #[tokio::test]
    async fn concurrent_appends_get_distinct_ids() {
        let ledger = Arc::new(ledger());

        let mut handles = Vec::new();
        for task in 0u8..4 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                let creator = AccountId::from_raw([task; 32]);
                let mut ids = Vec::new();
                for i in 0..25u64 {
                    let record = ledger
                        .append(Submission {
                            tx: TxId::new(),
                            creator: creator.clone(),
                            name: format!("task{task}-{i}"),
                            sum: i,
                        })
                        .await
                        .unwrap();
                    ids.push(record.id);
                }
                ids
            }));
        }

        let mut all_ids = Vec::new();
        for handle in handles {
            all_ids.extend(handle.await.unwrap());
        }

        all_ids.sort_unstable();
        let expected: Vec<u64> = (0..100).collect();
        assert_eq!(all_ids, expected);
        assert_eq!(ledger.count().await.unwrap(), 100);
        assert_eq!(ledger.journal().len(), 100);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        proptest! {
            #[test]
            fn n_appends_are_all_readable(
                entries in proptest::collection::vec(("[a-z]{0,8}", any::<u64>()), 1..16)
            ) {
                let runtime = tokio::runtime::Runtime::new().unwrap();
                runtime.block_on(async {
                    let ledger = ledger();
                    let creator = AccountId::from_raw([3; 32]);

                    for (name, sum) in &entries {
                        ledger
                            .append(Submission {
                                tx: TxId::new(),
                                creator: creator.clone(),
                                name: name.clone(),
                                sum: *sum,
                            })
                            .await
                            .unwrap();
                    }

                    assert_eq!(ledger.count().await.unwrap(), entries.len() as u64);
                    for (k, (name, sum)) in entries.iter().enumerate() {
                        let record = ledger.record(k as u64).await.unwrap();
                        assert_eq!(record.id, k as u64);
                        assert_eq!(&record.name, name);
                        assert_eq!(&record.sum, sum);
                    }
                    assert!(ledger.record(entries.len() as u64).await.is_err());
                });
            }
        }
    }
}
