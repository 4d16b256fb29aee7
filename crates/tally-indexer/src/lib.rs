//! Reconciling read-side indexer for Tally.
//!
//! The ledger only answers point lookups, so displayable history has to be
//! reconstructed: replay the notification stream, correlate each
//! announcement with the commit metadata of its transaction, fetch the
//! authoritative record, and publish the merged result as one immutable
//! [`HistoryView`].
//!
//! The indexer owns nothing but its last-published view. It is a pure
//! projection: rebuildable from its three collaborators at any time, and
//! deliberately paranoid about them. Whole-cycle failures leave the
//! previous view in place (stale beats blank); per-item correlation misses
//! are skipped and reported, never fatal.

pub mod error;
pub mod indexer;
pub mod view;

pub use error::IndexerError;
pub use indexer::{
    IndexerConfig, ReconcilingIndexer, RefreshPhase, RefreshReport, SkipReason, SkippedEntry,
};
pub use view::{HistoryOrder, HistoryView, ViewEntry};
