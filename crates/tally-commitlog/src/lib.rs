//! Commit metadata source for Tally.
//!
//! Appends reach the ledger inside transactions, and facts about those
//! transactions (commit number, timestamp, status) live outside the
//! ledger. This crate defines the lookup boundary the read-side indexer
//! correlates against, plus an in-memory implementation for the embedded
//! medium. Absence of metadata is data ("not yet committed"), never an
//! error.

pub mod error;
pub mod memory;
pub mod meta;
pub mod traits;

pub use error::{CommitLogError, CommitLogResult};
pub use memory::InMemoryCommitLog;
pub use meta::{CommitMeta, CommitStatus};
pub use traits::CommitLookup;
