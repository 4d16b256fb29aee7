use async_trait::async_trait;

use tally_node::{NodeError, NodeResult, Submitter};
use tally_types::{AccountId, IdentityMaterial};

use crate::error::ServerResult;

/// Identity resolved from request credentials.
///
/// Every identity carries the [`AccountId`] recorded as the creator of
/// anything it appends. Anonymous requests all share one well-known
/// account; bearer tokens map deterministically to per-token accounts.
#[derive(Clone, Debug)]
pub struct Identity {
    pub account: AccountId,
    pub label: String,
    pub anonymous: bool,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            account: AccountId::derive(&IdentityMaterial::Seed([0; 32])),
            label: "anonymous".into(),
            anonymous: true,
        }
    }

    pub fn bearer(token: &str) -> Self {
        let seed = *blake3::hash(token.as_bytes()).as_bytes();
        let prefix: String = token.chars().take(8).collect();
        Self {
            account: AccountId::derive(&IdentityMaterial::Seed(seed)),
            label: format!("bearer:{prefix}"),
            anonymous: false,
        }
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;
}

/// Accepts every credential. Anonymous callers get the shared anonymous
/// account; bearer tokens get their derived account without any
/// verification.
pub struct AllowAllAuth;

#[async_trait]
impl AuthProvider for AllowAllAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Bearer(token) => Ok(Identity::bearer(token)),
            Credentials::Anonymous => Ok(Identity::anonymous()),
        }
    }
}

/// Bridges a resolved [`Identity`] into the node's submitter seam,
/// applying the anonymous-append policy.
pub struct RequestSubmitter {
    identity: Identity,
    allow_anonymous: bool,
}

impl RequestSubmitter {
    pub fn new(identity: Identity, allow_anonymous: bool) -> Self {
        Self {
            identity,
            allow_anonymous,
        }
    }
}

#[async_trait]
impl Submitter for RequestSubmitter {
    async fn authorize(&self) -> NodeResult<AccountId> {
        if self.identity.anonymous && !self.allow_anonymous {
            return Err(NodeError::Denied("anonymous append is disabled".into()));
        }
        Ok(self.identity.account.clone())
    }
}
