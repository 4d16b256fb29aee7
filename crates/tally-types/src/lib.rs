//! Foundation types for Tally.
//!
//! This crate provides the identity and record types used throughout the
//! Tally system. Every other Tally crate depends on `tally-types`.
//!
//! # Key Types
//!
//! - [`AccountId`]: persistent submitter identity derived from key material
//! - [`TxId`]: UUID v7 identifier for a submission transaction
//! - [`Record`]: one appended ledger entry (id, name, sum, creator)

pub mod error;
pub mod identity;
pub mod record;
pub mod tx;

pub use error::TypeError;
pub use identity::{AccountId, IdentityMaterial};
pub use record::Record;
pub use tx::TxId;
