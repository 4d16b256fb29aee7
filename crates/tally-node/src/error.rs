use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NodeError {
    #[error("submission denied: {0}")]
    Denied(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] tally_ledger::LedgerError),

    #[error("commit log error: {0}")]
    CommitLog(#[from] tally_commitlog::CommitLogError),

    #[error("indexer error: {0}")]
    Indexer(#[from] tally_indexer::IndexerError),
}

pub type NodeResult<T> = Result<T, NodeError>;
