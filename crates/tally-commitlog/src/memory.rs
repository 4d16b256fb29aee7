use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use tally_types::TxId;

use crate::error::{CommitLogError, CommitLogResult};
use crate::meta::{CommitMeta, CommitStatus};
use crate::traits::CommitLookup;

/// In-memory, HashMap-based commit log.
///
/// Plays the medium's side of the commit metadata contract for tests and
/// embedding: `record` assigns the next monotonic commit number at the
/// current wall-clock time. Entries are held behind a `RwLock` for safe
/// concurrent access.
pub struct InMemoryCommitLog {
    inner: RwLock<CommitLogState>,
}

struct CommitLogState {
    entries: HashMap<TxId, CommitMeta>,
    next_number: u64,
}

impl InMemoryCommitLog {
    /// Create an empty commit log. Numbers start at 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CommitLogState {
                entries: HashMap::new(),
                next_number: 1,
            }),
        }
    }

    /// Record the given transaction as committed now.
    ///
    /// Assigns the next commit number. Recording the same transaction
    /// twice is idempotent and returns the original metadata.
    pub fn record(&self, tx: TxId) -> CommitLogResult<CommitMeta> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| CommitLogError::Unavailable("commit log lock poisoned".into()))?;

        if let Some(existing) = state.entries.get(&tx) {
            return Ok(existing.clone());
        }

        let meta = CommitMeta {
            number: state.next_number,
            timestamp: Utc::now(),
            status: CommitStatus::Committed,
        };
        state.next_number += 1;
        state.entries.insert(tx, meta.clone());
        Ok(meta)
    }

    /// Insert arbitrary metadata for a transaction. Test fixtures use
    /// this to model out-of-band media; it does not advance the counter.
    pub fn record_at(&self, tx: TxId, meta: CommitMeta) -> CommitLogResult<()> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| CommitLogError::Unavailable("commit log lock poisoned".into()))?;
        state.entries.insert(tx, meta);
        Ok(())
    }

    /// Drop the metadata for a transaction, as if it had never committed.
    pub fn forget(&self, tx: &TxId) -> CommitLogResult<bool> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| CommitLogError::Unavailable("commit log lock poisoned".into()))?;
        Ok(state.entries.remove(tx).is_some())
    }

    /// Number of transactions with recorded metadata.
    pub fn len(&self) -> usize {
        self.inner.read().map(|s| s.entries.len()).unwrap_or(0)
    }

    /// Returns `true` if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCommitLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommitLookup for InMemoryCommitLog {
    async fn commit_meta(&self, tx: &TxId) -> CommitLogResult<Option<CommitMeta>> {
        let state = self
            .inner
            .read()
            .map_err(|_| CommitLogError::Unavailable("commit log lock poisoned".into()))?;
        Ok(state.entries.get(tx).cloned())
    }
}

impl std::fmt::Debug for InMemoryCommitLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCommitLog")
            .field("entry_count", &self.len())
            .finish()
    }
}
