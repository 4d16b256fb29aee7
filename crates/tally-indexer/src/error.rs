/// Errors produced by the indexer.
///
/// Per-item correlation misses are not errors; they surface as skips in
/// the refresh report. An error here means a whole refresh cycle was
/// abandoned and the previously published view remains in effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexerError {
    /// A collaborator call the cycle cannot proceed without failed or
    /// timed out.
    #[error("refresh aborted: {call} unavailable: {reason}")]
    Unavailable { call: &'static str, reason: String },
}
