use async_trait::async_trait;

use tally_types::TxId;

use crate::error::CommitLogResult;
use crate::meta::CommitMeta;

/// Lookup boundary for commit metadata.
///
/// All implementations must satisfy these invariants:
/// - `Ok(None)` means "no commit facts for this transaction yet". A
///   transaction the source has never heard of and one still in flight
///   are indistinguishable, and both are ordinary answers.
/// - `Err` is reserved for failures to reach or read the source.
/// - Metadata for a transaction never changes once its status is
///   `Committed`.
/// - Arrival order is unconstrained: metadata may become visible before
///   or after the notification announcing the same transaction's append.
#[async_trait]
pub trait CommitLookup: Send + Sync {
    /// Commit facts for the given transaction, if any exist yet.
    async fn commit_meta(&self, tx: &TxId) -> CommitLogResult<Option<CommitMeta>>;
}
