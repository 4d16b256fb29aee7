use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use tally_commitlog::{CommitLookup, CommitMeta};
use tally_ledger::{LedgerError, LedgerReader};
use tally_stream::{NotificationFilter, NotificationStream};
use tally_types::TxId;

use crate::error::IndexerError;
use crate::view::{HistoryView, ViewEntry};

/// Configuration for the [`ReconcilingIndexer`].
#[derive(Clone, Debug)]
pub struct IndexerConfig {
    /// Upper bound on any single collaborator call during a refresh.
    pub call_timeout: Duration,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
        }
    }
}

/// Where the current (or last) refresh cycle stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPhase {
    /// No cycle running; the published view is current.
    Idle,
    /// Reading the ledger count and replaying the stream.
    Fetching,
    /// De-duplicating and indexing commit metadata.
    Correlating,
    /// Merging notifications, metadata, and authoritative records.
    Enriching,
    /// Swapping in the new view.
    Publishing,
    /// The last cycle did not complete; the previous view still stands.
    Failed,
}

/// Why a notification was left out of the published view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Another notification already announced this record id.
    DuplicateNotification,
    /// Another notification already claimed this transaction.
    DuplicateTx,
    /// No committed metadata for the transaction this cycle.
    UncommittedTx,
    /// The ledger does not (yet) hold the announced id.
    RecordOutOfRange,
    /// The record lookup failed or timed out this cycle.
    RecordUnavailable,
}

/// One notification excluded from the view, and why.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedEntry {
    pub id: u64,
    pub tx: TxId,
    pub reason: SkipReason,
}

/// Outcome of one successful refresh cycle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    /// Ledger count observed at fetch time.
    pub ledger_count: u64,
    /// Notifications replayed from the stream.
    pub notifications: u64,
    /// Entries in the newly published view.
    pub published: u64,
    /// Notifications excluded from the view this cycle.
    pub skipped: Vec<SkippedEntry>,
}

/// Rebuilds displayable history from the notification stream, the commit
/// metadata source, and ledger point lookups.
///
/// A refresh is all-or-nothing: the published view is swapped in a single
/// assignment once a cycle completes, and any cycle that aborts leaves the
/// previous view untouched. Concurrent refresh triggers serialize on an
/// internal gate, so exactly one cycle runs at a time. Per-item problems
/// (uncommitted transactions, stale announcements, one failed lookup) are
/// skipped and reported rather than failing the cycle.
pub struct ReconcilingIndexer {
    ledger: Arc<dyn LedgerReader>,
    commits: Arc<dyn CommitLookup>,
    stream: Arc<dyn NotificationStream>,
    config: IndexerConfig,
    published: RwLock<Arc<HistoryView>>,
    phase: RwLock<RefreshPhase>,
    refresh_gate: tokio::sync::Mutex<()>,
}

impl ReconcilingIndexer {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        commits: Arc<dyn CommitLookup>,
        stream: Arc<dyn NotificationStream>,
        config: IndexerConfig,
    ) -> Self {
        Self {
            ledger,
            commits,
            stream,
            config,
            published: RwLock::new(Arc::new(HistoryView::empty())),
            phase: RwLock::new(RefreshPhase::Idle),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// The last successfully published view. Empty before the first
    /// successful refresh; never partially built.
    pub fn history(&self) -> Arc<HistoryView> {
        Arc::clone(&self.published.read().expect("view lock poisoned"))
    }

    /// Current refresh phase.
    pub fn phase(&self) -> RefreshPhase {
        *self.phase.read().expect("phase lock poisoned")
    }

    /// Run one full refresh cycle and publish the result.
    ///
    /// Concurrent callers queue on the refresh gate and each runs its own
    /// complete cycle. On error the previous view stays published and the
    /// phase reads `Failed` until the next refresh.
    pub async fn refresh(&self) -> Result<RefreshReport, IndexerError> {
        let _gate = self.refresh_gate.lock().await;
        let guard = PhaseGuard::begin(&self.phase);

        let ledger_count = self.guarded("ledger count", self.ledger.count()).await?;
        let notifications = self
            .guarded(
                "notification replay",
                self.stream.replay(NotificationFilter::default()),
            )
            .await?;
        let replayed = notifications.len() as u64;

        guard.advance(RefreshPhase::Correlating);
        let mut skipped = Vec::new();
        let mut seen_ids = HashSet::new();
        let mut seen_txs = HashSet::new();
        let mut unique = Vec::with_capacity(notifications.len());
        for notification in notifications {
            if !seen_ids.insert(notification.id) {
                warn!(
                    id = notification.id,
                    tx = %notification.tx,
                    "duplicate announcement for record id; first one wins"
                );
                skipped.push(SkippedEntry {
                    id: notification.id,
                    tx: notification.tx,
                    reason: SkipReason::DuplicateNotification,
                });
                continue;
            }
            if !seen_txs.insert(notification.tx) {
                warn!(
                    id = notification.id,
                    tx = %notification.tx,
                    "transaction already announced another record; first one wins"
                );
                skipped.push(SkippedEntry {
                    id: notification.id,
                    tx: notification.tx,
                    reason: SkipReason::DuplicateTx,
                });
                continue;
            }
            unique.push(notification);
        }

        // Index commit metadata by transaction before matching: one lookup
        // per transaction, no per-record re-scan. A miss, error, or timeout
        // leaves the transaction out of the index, which downgrades it to
        // "uncommitted" for this cycle only.
        let mut metas: HashMap<TxId, CommitMeta> = HashMap::with_capacity(unique.len());
        for notification in &unique {
            match timeout(
                self.config.call_timeout,
                self.commits.commit_meta(&notification.tx),
            )
            .await
            {
                Ok(Ok(Some(meta))) => {
                    metas.insert(notification.tx, meta);
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => {
                    warn!(tx = %notification.tx, error = %e, "commit lookup failed; treating as uncommitted");
                }
                Err(_) => {
                    warn!(tx = %notification.tx, "commit lookup timed out; treating as uncommitted");
                }
            }
        }

        guard.advance(RefreshPhase::Enriching);
        let mut entries = Vec::with_capacity(unique.len());
        for notification in unique {
            let meta = match metas.get(&notification.tx) {
                Some(meta) if meta.is_committed() => meta,
                _ => {
                    debug!(id = notification.id, tx = %notification.tx, "not yet committed; skipping");
                    skipped.push(SkippedEntry {
                        id: notification.id,
                        tx: notification.tx,
                        reason: SkipReason::UncommittedTx,
                    });
                    continue;
                }
            };

            let record = match timeout(
                self.config.call_timeout,
                self.ledger.record(notification.id),
            )
            .await
            {
                Ok(Ok(record)) => record,
                Ok(Err(LedgerError::OutOfRange { id, count })) => {
                    warn!(id, count, tx = %notification.tx, "announced record not in ledger; skipping");
                    skipped.push(SkippedEntry {
                        id: notification.id,
                        tx: notification.tx,
                        reason: SkipReason::RecordOutOfRange,
                    });
                    continue;
                }
                Ok(Err(e)) => {
                    warn!(id = notification.id, error = %e, "record lookup failed; skipping");
                    skipped.push(SkippedEntry {
                        id: notification.id,
                        tx: notification.tx,
                        reason: SkipReason::RecordUnavailable,
                    });
                    continue;
                }
                Err(_) => {
                    warn!(id = notification.id, "record lookup timed out; skipping");
                    skipped.push(SkippedEntry {
                        id: notification.id,
                        tx: notification.tx,
                        reason: SkipReason::RecordUnavailable,
                    });
                    continue;
                }
            };

            entries.push(ViewEntry {
                record,
                tx: notification.tx,
                commit_number: meta.number,
                commit_timestamp: meta.timestamp,
            });
        }
        entries.sort_by(|a, b| b.record.id.cmp(&a.record.id));

        guard.advance(RefreshPhase::Publishing);
        let published = entries.len() as u64;
        let view = Arc::new(HistoryView {
            ledger_count,
            entries,
        });
        *self.published.write().expect("view lock poisoned") = view;
        guard.complete();

        debug!(
            ledger_count,
            notifications = replayed,
            published,
            skipped = skipped.len(),
            "view published"
        );

        Ok(RefreshReport {
            ledger_count,
            notifications: replayed,
            published,
            skipped,
        })
    }

    /// Subscribe to the notification stream and refresh on every delivery.
    ///
    /// Pending notifications are drained before each cycle so a burst of
    /// appends coalesces into one refresh. A lagged subscription also
    /// triggers a refresh, which is safe because every cycle replays the
    /// stream from position zero. The task ends when the stream closes.
    pub fn spawn_live(self: &Arc<Self>) -> JoinHandle<()> {
        let indexer = Arc::clone(self);
        let mut feed = indexer.stream.subscribe(NotificationFilter::default());
        tokio::spawn(async move {
            info!("live indexing started");
            loop {
                match feed.recv().await {
                    Ok(notification) => {
                        let mut coalesced = 0u64;
                        while feed.try_recv().is_ok() {
                            coalesced += 1;
                        }
                        debug!(id = notification.id, coalesced, "notification received; refreshing");
                        if let Err(e) = indexer.refresh().await {
                            warn!(error = %e, "live refresh failed; view unchanged");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "notification feed lagged; refreshing from scratch");
                        if let Err(e) = indexer.refresh().await {
                            warn!(error = %e, "catch-up refresh failed; view unchanged");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("notification feed closed; live indexing stopped");
                        break;
                    }
                }
            }
        })
    }

    async fn guarded<T, E>(
        &self,
        call: &'static str,
        operation: impl std::future::Future<Output = Result<T, E>>,
    ) -> Result<T, IndexerError>
    where
        E: std::fmt::Display,
    {
        match timeout(self.config.call_timeout, operation).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(IndexerError::Unavailable {
                call,
                reason: e.to_string(),
            }),
            Err(_) => Err(IndexerError::Unavailable {
                call,
                reason: format!("timed out after {:?}", self.config.call_timeout),
            }),
        }
    }
}

/// Tracks the phase across one cycle. A guard dropped before `complete`
/// marks the cycle `Failed`, so errors and cancellation both leave an
/// honest phase behind.
struct PhaseGuard<'a> {
    phase: &'a RwLock<RefreshPhase>,
    armed: bool,
}

impl<'a> PhaseGuard<'a> {
    fn begin(phase: &'a RwLock<RefreshPhase>) -> Self {
        let guard = Self { phase, armed: true };
        guard.advance(RefreshPhase::Fetching);
        guard
    }

    fn advance(&self, next: RefreshPhase) {
        *self.phase.write().expect("phase lock poisoned") = next;
    }

    fn complete(mut self) {
        self.advance(RefreshPhase::Idle);
        self.armed = false;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.phase.write().expect("phase lock poisoned") = RefreshPhase::Failed;
        }
    }
}
