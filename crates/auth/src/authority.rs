//! Session issuance, validation, renewal, and revocation.
//!
//! All session lifecycle operations go through [`SessionAuthority`];
//! callers must not reach around it to the store, so any future audit or
//! metrics hook has a single home.
//!
//! A session moves through exactly one of two terminal transitions:
//! ACTIVE -> EXPIRED (time passes, or a sweep deletes the row) or
//! ACTIVE -> REVOKED (explicit delete). Neither is reversible; callers
//! re-issue rather than resurrect.

use std::fmt;
use std::sync::Arc;

use gatehouse_core::error::{AuthError, AuthResult};
use gatehouse_core::id::SessionId;
use gatehouse_core::time::Clock;
use gatehouse_core::types::{DbId, EpochMillis};

use crate::config::SessionConfig;
use crate::cookie::SessionCookie;
use crate::store::{AuthAccount, NewSession, SessionRecord, SessionStore};
use crate::token::{generate_session_token, looks_like_session_token, token_log_prefix};

/// A freshly issued session plus the cookie the transport layer attaches.
#[derive(Debug)]
pub struct IssuedSession {
    pub session: SessionRecord,
    pub cookie: SessionCookie,
}

/// Why a request was not authenticated.
///
/// Kept distinct internally for logging; the HTTP boundary collapses all
/// four into a single "unauthorized" status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No token was presented.
    Absent,
    /// The presented token is syntactically impossible.
    Malformed,
    /// No session row matches the token.
    NotFound,
    /// The session existed but its expiry has passed.
    Expired,
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DenyReason::Absent => "absent",
            DenyReason::Malformed => "malformed",
            DenyReason::NotFound => "not-found",
            DenyReason::Expired => "expired",
        })
    }
}

/// Outcome of the per-request validation contract.
///
/// Storage failures never appear here -- they stay on the error channel so
/// the caller can distinguish "unauthenticated" from "backend down".
#[derive(Debug)]
pub enum Verdict {
    Allowed(SessionRecord),
    Denied(DenyReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed(_))
    }
}

/// Orchestrates the session lifecycle against a [`SessionStore`].
pub struct SessionAuthority<S> {
    store: S,
    config: SessionConfig,
    clock: Arc<dyn Clock>,
}

impl<S: SessionStore> SessionAuthority<S> {
    pub fn new(store: S, config: SessionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Create a session for an authenticated account.
    ///
    /// The absolute expiry is `now + ttl`, where the TTL was fixed by the
    /// deployment mode at construction. A token collision surfaces as
    /// [`AuthError::Duplicate`] -- the caller may retry, an existing session
    /// is never overwritten.
    pub async fn issue(
        &self,
        account: AuthAccount,
        device: &str,
        os: &str,
    ) -> AuthResult<IssuedSession> {
        let token = generate_session_token();
        let public_id = SessionId::generate();
        let expires_at = self.clock.now_ms() + self.config.session_ttl_ms();

        let new_session = NewSession {
            public_id,
            token: token.clone(),
            account,
            device: device.to_string(),
            os: os.to_string(),
            expires_at,
        };
        self.store.create(&new_session).await?;

        tracing::debug!(
            session = %public_id,
            account = %account.public_id,
            expires_at,
            "session issued"
        );

        Ok(IssuedSession {
            session: SessionRecord {
                public_id,
                token: token.clone(),
                account,
                device: new_session.device,
                os: new_session.os,
                expires_at,
            },
            cookie: SessionCookie::for_session(&self.config, token),
        })
    }

    /// Resolve a token into its session + account, enforcing expiry.
    ///
    /// An expired session is deleted opportunistically before reporting
    /// [`AuthError::Expired`], so a later lookup of the same token finds
    /// nothing.
    pub async fn validate(&self, token: &str) -> AuthResult<SessionRecord> {
        if !looks_like_session_token(token) {
            // Rejected before any storage access.
            return Err(AuthError::Malformed("session token".to_string()));
        }

        let Some(session) = self.store.get_with_account(token).await? else {
            return Err(AuthError::NotFound);
        };

        if session.is_expired_at(self.clock.now_ms()) {
            if let Err(err) = self.store.delete(token).await {
                tracing::warn!(
                    session = %session.public_id,
                    error = %err,
                    "failed to clean up expired session"
                );
            }
            return Err(AuthError::Expired);
        }

        Ok(session)
    }

    /// Per-request validation contract for the transport layer.
    ///
    /// Returns a [`Verdict`]; only storage failures produce an `Err`.
    pub async fn authenticate(&self, token: Option<&str>) -> AuthResult<Verdict> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Verdict::Denied(DenyReason::Absent));
        };

        match self.validate(token).await {
            Ok(session) => Ok(Verdict::Allowed(session)),
            Err(err) => {
                let reason = match err {
                    AuthError::Malformed(_) => DenyReason::Malformed,
                    AuthError::NotFound => DenyReason::NotFound,
                    AuthError::Expired => DenyReason::Expired,
                    other => return Err(other),
                };
                tracing::debug!(
                    token_prefix = %token_log_prefix(token),
                    reason = %reason,
                    "session rejected"
                );
                Ok(Verdict::Denied(reason))
            }
        }
    }

    /// Extend a live session's expiry in place to `now + ttl`.
    ///
    /// Only an ACTIVE session can be renewed: a session already past its
    /// expiry is deleted and reported as [`AuthError::Expired`], never
    /// extended back to life. Fails with [`AuthError::NotFound`] if the
    /// token is absent; the caller decides whether that is fatal.
    /// Concurrent renewals are last-writer-wins under the backend's row
    /// locking.
    pub async fn renew(&self, token: &str) -> AuthResult<EpochMillis> {
        let session = self.validate(token).await?;
        let expires_at = self.clock.now_ms() + self.config.session_ttl_ms();
        self.store.renew(token, expires_at).await?;
        tracing::debug!(session = %session.public_id, expires_at, "session renewed");
        Ok(expires_at)
    }

    /// Revoke a single session. Idempotent.
    pub async fn revoke(&self, token: &str) -> AuthResult<()> {
        self.store.delete(token).await
    }

    /// Revoke every session an account currently holds. A zero-session
    /// account is a no-op.
    pub async fn revoke_all(&self, account_id: DbId) -> AuthResult<()> {
        self.store.delete_all_for_account(account_id).await
    }

    /// All live sessions for an account.
    pub async fn sessions_for_account(&self, account_id: DbId) -> AuthResult<Vec<SessionRecord>> {
        self.store.list_for_account(account_id).await
    }

    /// Delete every session past its expiry. Runs on a schedule and
    /// on demand; returns the number of rows removed.
    pub async fn sweep_expired(&self) -> AuthResult<u64> {
        self.store.sweep_expired(self.clock.now_ms()).await
    }

    /// Blank cookie for logout responses.
    pub fn blank_cookie(&self) -> SessionCookie {
        SessionCookie::blank(&self.config)
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}
