/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The requested id has not been assigned yet.
    #[error("record id {id} is out of range; ledger holds {count} records")]
    OutOfRange { id: u64, count: u64 },

    /// The ledger declined the submission. Not retryable.
    #[error("submission rejected: {reason}")]
    Rejected { reason: String },

    /// The ledger could not be reached or is in a degraded state.
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}
