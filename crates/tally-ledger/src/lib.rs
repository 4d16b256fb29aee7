//! Append-only record ledger for Tally.
//!
//! This crate is the authoritative store. It provides:
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - The three append entry points, all funneling into one primitive
//! - `InMemoryLedger` implementation for tests, demos, and embedding
//! - Ledger/stream consistency auditing
//!
//! The ledger assigns every accepted record a dense, strictly increasing
//! id equal to its append-order position, announces it on the notification
//! journal within the same mutation boundary, and supports nothing but
//! point lookups and a count on the read side. History enumeration is the
//! read-side indexer's job, not the ledger's.

pub mod error;
pub mod memory;
pub mod traits;
pub mod validation;

pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use traits::{LedgerReader, LedgerWriter, Submission};
pub use validation::{AuditReport, LedgerAudit, Violation, ViolationKind};
