//! Embedded tally node.
//!
//! Assembles the append-only ledger, its notification journal, the commit
//! log, and the reconciling indexer into one process-local unit. This is
//! the entry point for applications embedding tally directly; the HTTP
//! surface in `tally-server` is a thin layer over this crate.

pub mod error;
pub mod node;
pub mod submit;

pub use error::{NodeError, NodeResult};
pub use node::{AppendOutcome, NodeConfig, TallyNode};
pub use submit::{StaticSubmitter, Submitter};

// Re-export key types
pub use tally_indexer::{
    HistoryOrder, HistoryView, RefreshReport, SkipReason, SkippedEntry, ViewEntry,
};
pub use tally_ledger::AuditReport;
pub use tally_types::{AccountId, Record, TxId};
