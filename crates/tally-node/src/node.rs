use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use tally_commitlog::{CommitLookup, InMemoryCommitLog};
use tally_indexer::{HistoryView, IndexerConfig, ReconcilingIndexer, RefreshReport};
use tally_ledger::{
    AuditReport, InMemoryLedger, LedgerAudit, LedgerReader, LedgerWriter, Submission,
};
use tally_stream::{JournalConfig, NotificationJournal, NotificationStream};
use tally_types::{AccountId, Record, TxId};

use crate::error::NodeResult;
use crate::submit::Submitter;

/// Configuration for an embedded node.
#[derive(Clone, Debug, Default)]
pub struct NodeConfig {
    pub journal: JournalConfig,
    pub indexer: IndexerConfig,
}

/// One accepted append: the stored record and the transaction that
/// carried it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppendOutcome {
    pub record: Record,
    pub tx: TxId,
}

/// An embedded tally node.
///
/// Wires the in-memory ledger, its notification journal, the commit log,
/// and the reconciling indexer into one process-local unit, and exposes
/// the public operations: the three append entry points, point reads,
/// and the displayable history view.
pub struct TallyNode {
    journal: Arc<NotificationJournal>,
    ledger: Arc<InMemoryLedger>,
    commits: Arc<InMemoryCommitLog>,
    indexer: Arc<ReconcilingIndexer>,
}

impl TallyNode {
    pub fn new() -> Self {
        Self::with_config(NodeConfig::default())
    }

    pub fn with_config(config: NodeConfig) -> Self {
        let journal = Arc::new(NotificationJournal::new(config.journal));
        let ledger = Arc::new(InMemoryLedger::new(Arc::clone(&journal)));
        let commits = Arc::new(InMemoryCommitLog::new());
        let indexer = Arc::new(ReconcilingIndexer::new(
            Arc::clone(&ledger) as Arc<dyn LedgerReader>,
            Arc::clone(&commits) as Arc<dyn CommitLookup>,
            Arc::clone(&journal) as Arc<dyn NotificationStream>,
            config.indexer,
        ));
        Self {
            journal,
            ledger,
            commits,
            indexer,
        }
    }

    // ---- Append operations ----

    pub async fn append(
        &self,
        submitter: &dyn Submitter,
        name: &str,
        sum: u64,
    ) -> NodeResult<AppendOutcome> {
        let (creator, tx) = self.open_tx(submitter).await?;
        let record = self
            .ledger
            .append(Submission {
                tx,
                creator,
                name: name.to_string(),
                sum,
            })
            .await?;
        Ok(AppendOutcome { record, tx })
    }

    pub async fn append_name_only(
        &self,
        submitter: &dyn Submitter,
        name: &str,
    ) -> NodeResult<AppendOutcome> {
        let (creator, tx) = self.open_tx(submitter).await?;
        let record = self
            .ledger
            .append_name_only(tx, creator, name.to_string())
            .await?;
        Ok(AppendOutcome { record, tx })
    }

    pub async fn append_sum_of_two(
        &self,
        submitter: &dyn Submitter,
        a: u64,
        b: u64,
    ) -> NodeResult<AppendOutcome> {
        let (creator, tx) = self.open_tx(submitter).await?;
        let record = self.ledger.append_sum_of_two(tx, creator, a, b).await?;
        Ok(AppendOutcome { record, tx })
    }

    // ---- Read operations ----

    pub async fn record(&self, id: u64) -> NodeResult<Record> {
        Ok(self.ledger.record(id).await?)
    }

    pub async fn count(&self) -> NodeResult<u64> {
        Ok(self.ledger.count().await?)
    }

    // ---- History ----

    /// The last published view. Never blocks and never fails; an empty
    /// view means no refresh has completed yet.
    pub fn history(&self) -> Arc<HistoryView> {
        self.indexer.history()
    }

    /// Rebuild the view from the journal, commit log, and ledger.
    pub async fn refresh(&self) -> NodeResult<RefreshReport> {
        Ok(self.indexer.refresh().await?)
    }

    /// Keep the view fresh by refreshing on every journal announcement.
    pub fn start_live(&self) -> JoinHandle<()> {
        self.indexer.spawn_live()
    }

    // ---- Diagnostics ----

    /// Cross-check the ledger against its notification journal.
    pub async fn audit(&self) -> NodeResult<AuditReport> {
        let report = LedgerAudit::check(self.ledger.as_ref(), self.journal.as_ref()).await?;
        Ok(report)
    }

    // ---- Accessors ----

    pub fn journal(&self) -> &Arc<NotificationJournal> {
        &self.journal
    }

    pub fn ledger(&self) -> &Arc<InMemoryLedger> {
        &self.ledger
    }

    pub fn commits(&self) -> &Arc<InMemoryCommitLog> {
        &self.commits
    }

    pub fn indexer(&self) -> &Arc<ReconcilingIndexer> {
        &self.indexer
    }

    async fn open_tx(&self, submitter: &dyn Submitter) -> NodeResult<(AccountId, TxId)> {
        let creator = submitter.authorize().await?;
        let tx = TxId::new();
        // Commit metadata lands before the ledger sees the submission, so
        // a notification can never outrun its commit entry.
        self.commits.record(tx)?;
        debug!(%tx, creator = %creator, "transaction opened");
        Ok((creator, tx))
    }
}

impl Default for TallyNode {
    fn default() -> Self {
        Self::new()
    }
}
