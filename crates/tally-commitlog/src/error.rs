/// Errors produced by commit metadata operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitLogError {
    /// The metadata source could not be reached.
    #[error("commit log unavailable: {0}")]
    Unavailable(String),
}

/// Convenience alias used throughout the commit log crate.
pub type CommitLogResult<T> = Result<T, CommitLogError>;
