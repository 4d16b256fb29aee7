use async_trait::async_trait;

use tally_types::{AccountId, Record, TxId};

use crate::error::LedgerError;

/// A single append request as delivered by the medium.
///
/// The `tx` identifies the submission transaction and is assigned by the
/// medium, never by the ledger. The ledger stores `creator`, `name`, and
/// `sum` verbatim; it never inspects them.
#[derive(Clone, Debug)]
pub struct Submission {
    pub tx: TxId,
    pub creator: AccountId,
    pub name: String,
    pub sum: u64,
}

/// Write boundary for ledger append operations.
///
/// Implementations may sit across a process boundary, so every operation
/// is async and fallible. All three entry points funnel into the single
/// `append` primitive and therefore share its id-assignment, counting,
/// and notification contract.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Append one record.
    ///
    /// Assigns the next dense id, stores the record, and announces it on
    /// the notification stream as one atomic unit. There are no
    /// preconditions on `name` or `sum`.
    async fn append(&self, submission: Submission) -> Result<Record, LedgerError>;

    /// Append with only a name; the sum defaults to zero.
    async fn append_name_only(
        &self,
        tx: TxId,
        creator: AccountId,
        name: String,
    ) -> Result<Record, LedgerError> {
        self.append(Submission {
            tx,
            creator,
            name,
            sum: 0,
        })
        .await
    }

    /// Append the sum of two operands; the name defaults to empty.
    ///
    /// The addition is checked: an overflowing pair is `Rejected` before
    /// anything is stored or announced.
    async fn append_sum_of_two(
        &self,
        tx: TxId,
        creator: AccountId,
        a: u64,
        b: u64,
    ) -> Result<Record, LedgerError> {
        let sum = a.checked_add(b).ok_or_else(|| LedgerError::Rejected {
            reason: format!("sum overflows u64: {a} + {b}"),
        })?;
        self.append(Submission {
            tx,
            creator,
            name: String::new(),
            sum,
        })
        .await
    }
}

/// Read boundary for ledger point lookups.
///
/// The ledger exposes no enumeration: `record` looks up one id and
/// `count` reports how many ids exist. `count()` is always one past the
/// highest valid id.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// The record stored under `id`, unchanged since its append.
    ///
    /// Fails with [`LedgerError::OutOfRange`] when `id >= count()`.
    async fn record(&self, id: u64) -> Result<Record, LedgerError>;

    /// Number of records appended so far.
    async fn count(&self) -> Result<u64, LedgerError>;
}
