//! Identity directory abstraction.
//!
//! The production identity provider (sign-up, credential verification,
//! token refresh) is an external subsystem; the catalogue core only needs
//! to look up a caller's registered email and attach the admin claim to
//! their account. Claims attached here surface in tokens issued afterwards,
//! so a promoted caller picks up admin rights on their next login.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Directory record for one account
#[derive(Debug, Clone)]
pub struct Account {
    pub email: String,
    pub admin: bool,
}

#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    /// Create or refresh the directory record for `uid`. Registration keeps
    /// any admin claim already attached.
    async fn register(&self, uid: &str, email: &str) -> Account;

    /// Look up the account registered for `uid`.
    async fn lookup(&self, uid: &str) -> Option<Account>;

    /// Attach the admin claim to `uid`. Idempotent; attaching to an unknown
    /// uid is a no-op.
    async fn set_admin_claim(&self, uid: &str);
}

/// In-process directory standing in for the external identity provider.
#[derive(Default)]
pub struct MemoryDirectory {
    accounts: RwLock<HashMap<String, Account>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityDirectory for MemoryDirectory {
    async fn register(&self, uid: &str, email: &str) -> Account {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .entry(uid.to_string())
            .and_modify(|a| a.email = email.to_string())
            .or_insert(Account {
                email: email.to_string(),
                admin: false,
            });
        account.clone()
    }

    async fn lookup(&self, uid: &str) -> Option<Account> {
        let accounts = self.accounts.read().await;
        accounts.get(uid).cloned()
    }

    async fn set_admin_claim(&self, uid: &str) {
        let mut accounts = self.accounts.write().await;
        if let Some(account) = accounts.get_mut(uid) {
            account.admin = true;
        }
    }
}
