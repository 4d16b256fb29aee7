use async_trait::async_trait;

use tally_types::AccountId;

use crate::error::NodeResult;

/// Resolves who is submitting before a mutation runs.
///
/// The node never invents identities. Every append entry point takes a
/// `Submitter`, and the implementation decides whether the caller may
/// write: a fixed identity for embedded use, a credential check at the
/// HTTP boundary, or anything else that can produce an [`AccountId`].
#[async_trait]
pub trait Submitter: Send + Sync {
    /// The identity to record as the creator, or why the submission may
    /// not proceed.
    async fn authorize(&self) -> NodeResult<AccountId>;
}

/// A submitter with a fixed, pre-authorized identity.
pub struct StaticSubmitter {
    account: AccountId,
}

impl StaticSubmitter {
    pub fn new(account: AccountId) -> Self {
        Self { account }
    }

    /// A random identity for demos and tests.
    pub fn ephemeral() -> Self {
        Self::new(AccountId::ephemeral())
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }
}

#[async_trait]
impl Submitter for StaticSubmitter {
    async fn authorize(&self) -> NodeResult<AccountId> {
        Ok(self.account.clone())
    }
}
