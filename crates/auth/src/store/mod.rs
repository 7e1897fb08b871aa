//! Storage seams for the session core.
//!
//! [`SessionStore`] and [`AccountStore`] are the only contracts the
//! authority and service depend on, so any storage engine can satisfy them:
//! [`pg`] adapts the relational schema, [`memory`] is a HashMap-backed
//! implementation used by the behavior tests.

use async_trait::async_trait;
use gatehouse_core::error::AuthResult;
use gatehouse_core::id::{AccountId, SessionId};
use gatehouse_core::types::{DbId, EpochMillis, Role};

pub mod memory;
pub mod pg;

pub use memory::{MemoryAccountStore, MemorySessionStore};
pub use pg::{PgAccountStore, PgSessionStore};

/// Minimal account projection needed to authorize a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthAccount {
    /// Internal storage id.
    pub id: DbId,
    /// Externally stable, type-tagged id.
    pub public_id: AccountId,
    pub role: Role,
}

/// A stored session joined with its owner's auth projection.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub public_id: SessionId,
    /// The bearer token this session is looked up by.
    pub token: String,
    pub account: AuthAccount,
    pub device: String,
    pub os: String,
    /// Absolute expiry, epoch milliseconds.
    pub expires_at: EpochMillis,
}

impl SessionRecord {
    /// Whether the session is past its expiry at the given instant.
    pub fn is_expired_at(&self, now: EpochMillis) -> bool {
        self.expires_at <= now
    }
}

/// Payload for creating a session row.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub public_id: SessionId,
    pub token: String,
    pub account: AuthAccount,
    pub device: String,
    pub os: String,
    pub expires_at: EpochMillis,
}

/// Persistence contract for sessions.
///
/// Each operation is a transactional unit. Expiry is never interpreted here;
/// the [`crate::SessionAuthority`] owns the comparison against "now".
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session. A token collision fails with
    /// [`gatehouse_core::error::AuthError::Duplicate`] -- never overwrite.
    async fn create(&self, session: &NewSession) -> AuthResult<()>;

    /// Look up a session by token, joined with the minimal account
    /// projection so validation needs no second round trip.
    async fn get_with_account(&self, token: &str) -> AuthResult<Option<SessionRecord>>;

    /// All sessions currently held by an account.
    async fn list_for_account(&self, account_id: DbId) -> AuthResult<Vec<SessionRecord>>;

    /// Delete by token. Idempotent: an absent token is not an error.
    async fn delete(&self, token: &str) -> AuthResult<()>;

    /// Delete every session the account held at the start of the call.
    /// Zero sessions is a no-op. A session created concurrently with the
    /// deletion may or may not survive (accepted race, see DESIGN.md).
    async fn delete_all_for_account(&self, account_id: DbId) -> AuthResult<()>;

    /// Update expiry in place. Fails with `NotFound` if the token is absent;
    /// the caller decides whether that is fatal.
    async fn renew(&self, token: &str, expires_at: EpochMillis) -> AuthResult<()>;

    /// Delete every session with `expires_at <= now`; returns the count.
    async fn sweep_expired(&self, now: EpochMillis) -> AuthResult<u64>;
}

/// Credentials view of an account, fetched only by the login path.
///
/// The password hash never travels further than [`crate::service`]'s verify
/// call; it must not appear in responses or logs.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub account: AuthAccount,
    pub email: String,
    pub email_verified: bool,
    pub password_hash: String,
}

/// Payload for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub public_id: AccountId,
    pub first_name: String,
    pub last_name: Option<String>,
    /// Stored lowercased; uniqueness is enforced on this form.
    pub email: String,
    pub password_hash: String,
    pub mobile: Option<String>,
}

/// Account-lookup collaborator consumed by the session core.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account with role `user`, returning its auth projection.
    /// A duplicate email (or `(role, mobile)` pair) fails with `Duplicate`.
    async fn create(&self, input: &NewAccount) -> AuthResult<AuthAccount>;

    /// Credentials lookup for login. `None` means no such email.
    async fn find_credentials_by_email(&self, email: &str)
        -> AuthResult<Option<AccountCredentials>>;

    /// Auth projection by internal id.
    async fn find_auth_by_id(&self, id: DbId) -> AuthResult<Option<AuthAccount>>;

    /// Signup pre-check: email taken, or mobile taken when supplied.
    async fn email_or_mobile_taken(&self, email: &str, mobile: Option<&str>) -> AuthResult<bool>;

    /// Stamp `last_login_at` after a successful authentication.
    async fn record_login(&self, id: DbId, at: EpochMillis) -> AuthResult<()>;
}

// Shared handles satisfy the contracts too, so tests and callers can keep a
// reference to the store they hand to the authority.

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStore for std::sync::Arc<S> {
    async fn create(&self, session: &NewSession) -> AuthResult<()> {
        (**self).create(session).await
    }

    async fn get_with_account(&self, token: &str) -> AuthResult<Option<SessionRecord>> {
        (**self).get_with_account(token).await
    }

    async fn list_for_account(&self, account_id: DbId) -> AuthResult<Vec<SessionRecord>> {
        (**self).list_for_account(account_id).await
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        (**self).delete(token).await
    }

    async fn delete_all_for_account(&self, account_id: DbId) -> AuthResult<()> {
        (**self).delete_all_for_account(account_id).await
    }

    async fn renew(&self, token: &str, expires_at: EpochMillis) -> AuthResult<()> {
        (**self).renew(token, expires_at).await
    }

    async fn sweep_expired(&self, now: EpochMillis) -> AuthResult<u64> {
        (**self).sweep_expired(now).await
    }
}

#[async_trait]
impl<A: AccountStore + ?Sized> AccountStore for std::sync::Arc<A> {
    async fn create(&self, input: &NewAccount) -> AuthResult<AuthAccount> {
        (**self).create(input).await
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> AuthResult<Option<AccountCredentials>> {
        (**self).find_credentials_by_email(email).await
    }

    async fn find_auth_by_id(&self, id: DbId) -> AuthResult<Option<AuthAccount>> {
        (**self).find_auth_by_id(id).await
    }

    async fn email_or_mobile_taken(&self, email: &str, mobile: Option<&str>) -> AuthResult<bool> {
        (**self).email_or_mobile_taken(email, mobile).await
    }

    async fn record_login(&self, id: DbId, at: EpochMillis) -> AuthResult<()> {
        (**self).record_login(id, at).await
    }
}
