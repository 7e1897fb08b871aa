//! In-memory store implementations.
//!
//! A second engine behind the storage traits: HashMap-backed, no
//! durability. The behavior tests run against these so the session state
//! machine can be exercised without a live database.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use gatehouse_core::error::{AuthError, AuthResult};
use gatehouse_core::types::{DbId, EpochMillis, Role};

use super::{
    AccountCredentials, AccountStore, AuthAccount, NewAccount, NewSession, SessionRecord,
    SessionStore,
};

/// [`SessionStore`] keyed by session token.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live rows; test-support.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionRecord>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: &NewSession) -> AuthResult<()> {
        let mut sessions = self.lock();
        if sessions.contains_key(&session.token) {
            return Err(AuthError::Duplicate("session_token"));
        }
        sessions.insert(
            session.token.clone(),
            SessionRecord {
                public_id: session.public_id,
                token: session.token.clone(),
                account: session.account,
                device: session.device.clone(),
                os: session.os.clone(),
                expires_at: session.expires_at,
            },
        );
        Ok(())
    }

    async fn get_with_account(&self, token: &str) -> AuthResult<Option<SessionRecord>> {
        Ok(self.lock().get(token).cloned())
    }

    async fn list_for_account(&self, account_id: DbId) -> AuthResult<Vec<SessionRecord>> {
        Ok(self
            .lock()
            .values()
            .filter(|s| s.account.id == account_id)
            .cloned()
            .collect())
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        self.lock().remove(token);
        Ok(())
    }

    async fn delete_all_for_account(&self, account_id: DbId) -> AuthResult<()> {
        // Same read-then-delete shape as the relational store.
        let mut sessions = self.lock();
        let tokens: Vec<String> = sessions
            .values()
            .filter(|s| s.account.id == account_id)
            .map(|s| s.token.clone())
            .collect();
        for token in tokens {
            sessions.remove(&token);
        }
        Ok(())
    }

    async fn renew(&self, token: &str, expires_at: EpochMillis) -> AuthResult<()> {
        match self.lock().get_mut(token) {
            Some(session) => {
                session.expires_at = expires_at;
                Ok(())
            }
            None => Err(AuthError::NotFound),
        }
    }

    async fn sweep_expired(&self, now: EpochMillis) -> AuthResult<u64> {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        Ok((before - sessions.len()) as u64)
    }
}

#[derive(Debug)]
struct StoredAccount {
    account: AuthAccount,
    email: String,
    email_verified: bool,
    password_hash: String,
    mobile: Option<String>,
    last_login_at: Option<EpochMillis>,
}

/// [`AccountStore`] over a growable vector with serial ids.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Vec<StoredAccount>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last recorded login for an account; test-support.
    pub fn last_login_at(&self, id: DbId) -> Option<EpochMillis> {
        self.lock()
            .iter()
            .find(|a| a.account.id == id)
            .and_then(|a| a.last_login_at)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StoredAccount>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, input: &NewAccount) -> AuthResult<AuthAccount> {
        let mut rows = self.lock();
        if rows.iter().any(|a| a.email == input.email) {
            return Err(AuthError::Duplicate("email"));
        }
        if let Some(mobile) = &input.mobile {
            if rows
                .iter()
                .any(|a| a.account.role == Role::User && a.mobile.as_ref() == Some(mobile))
            {
                return Err(AuthError::Duplicate("mobile"));
            }
        }
        let account = AuthAccount {
            id: rows.len() as DbId + 1,
            public_id: input.public_id,
            role: Role::User,
        };
        rows.push(StoredAccount {
            account,
            email: input.email.clone(),
            email_verified: false,
            password_hash: input.password_hash.clone(),
            mobile: input.mobile.clone(),
            last_login_at: None,
        });
        Ok(account)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> AuthResult<Option<AccountCredentials>> {
        Ok(self.lock().iter().find(|a| a.email == email).map(|a| {
            AccountCredentials {
                account: a.account,
                email: a.email.clone(),
                email_verified: a.email_verified,
                password_hash: a.password_hash.clone(),
            }
        }))
    }

    async fn find_auth_by_id(&self, id: DbId) -> AuthResult<Option<AuthAccount>> {
        Ok(self
            .lock()
            .iter()
            .find(|a| a.account.id == id)
            .map(|a| a.account))
    }

    async fn email_or_mobile_taken(&self, email: &str, mobile: Option<&str>) -> AuthResult<bool> {
        Ok(self
            .lock()
            .iter()
            .any(|a| a.email == email || (mobile.is_some() && a.mobile.as_deref() == mobile)))
    }

    async fn record_login(&self, id: DbId, at: EpochMillis) -> AuthResult<()> {
        if let Some(row) = self.lock().iter_mut().find(|a| a.account.id == id) {
            row.last_login_at = Some(at);
        }
        Ok(())
    }
}
