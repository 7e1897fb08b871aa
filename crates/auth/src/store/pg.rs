//! Postgres-backed store implementations.
//!
//! Thin adapters over the `gatehouse-db` repositories: they translate row
//! structs into the value objects of [`super`] and map backend failures into
//! the core error taxonomy.

use async_trait::async_trait;
use gatehouse_core::error::{AuthError, AuthResult};
use gatehouse_core::id::{AccountId, SessionId};
use gatehouse_core::types::{DbId, EpochMillis, Role};
use gatehouse_db::models::account::{Account, CreateAccount};
use gatehouse_db::models::session::{CreateSession, SessionWithAccount};
use gatehouse_db::repositories::{AccountRepo, SessionRepo};
use gatehouse_db::DbPool;

use super::{
    AccountCredentials, AccountStore, AuthAccount, NewAccount, NewSession, SessionRecord,
    SessionStore,
};
use crate::token::token_log_prefix;

/// [`SessionStore`] over the `sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, session: &NewSession) -> AuthResult<()> {
        let input = CreateSession {
            public_id: session.public_id.as_uuid(),
            account_id: session.account.id,
            account_public_id: session.account.public_id.as_uuid(),
            session_token: session.token.clone(),
            device: session.device.clone(),
            os: session.os.clone(),
            expires_at: session.expires_at,
        };
        SessionRepo::create(&self.pool, &input)
            .await
            .map_err(|e| map_sqlx_error("create_session", e))?;
        Ok(())
    }

    async fn get_with_account(&self, token: &str) -> AuthResult<Option<SessionRecord>> {
        SessionRepo::find_with_account_by_token(&self.pool, token)
            .await
            .map_err(|e| map_sqlx_error("get_session_with_account", e))?
            .map(session_record_from_row)
            .transpose()
    }

    async fn list_for_account(&self, account_id: DbId) -> AuthResult<Vec<SessionRecord>> {
        SessionRepo::list_for_account(&self.pool, account_id)
            .await
            .map_err(|e| map_sqlx_error("list_sessions_for_account", e))?
            .into_iter()
            .map(session_record_from_row)
            .collect()
    }

    async fn delete(&self, token: &str) -> AuthResult<()> {
        let deleted = SessionRepo::delete_by_token(&self.pool, token)
            .await
            .map_err(|e| map_sqlx_error("delete_session", e))?;
        tracing::debug!(
            token_prefix = %token_log_prefix(token),
            deleted,
            "session delete"
        );
        Ok(())
    }

    async fn delete_all_for_account(&self, account_id: DbId) -> AuthResult<()> {
        // Read-then-delete: the set removed is exactly the set that existed
        // when the call started.
        let tokens = SessionRepo::list_tokens_for_account(&self.pool, account_id)
            .await
            .map_err(|e| map_sqlx_error("list_session_tokens", e))?;
        if tokens.is_empty() {
            return Ok(());
        }
        let deleted = SessionRepo::delete_by_tokens(&self.pool, &tokens)
            .await
            .map_err(|e| map_sqlx_error("delete_account_sessions", e))?;
        tracing::debug!(account_id, deleted, "bulk session revocation");
        Ok(())
    }

    async fn renew(&self, token: &str, expires_at: EpochMillis) -> AuthResult<()> {
        let updated = SessionRepo::update_expiry(&self.pool, token, expires_at)
            .await
            .map_err(|e| map_sqlx_error("renew_session", e))?;
        if updated {
            Ok(())
        } else {
            Err(AuthError::NotFound)
        }
    }

    async fn sweep_expired(&self, now: EpochMillis) -> AuthResult<u64> {
        let deleted = SessionRepo::delete_expired(&self.pool, now)
            .await
            .map_err(|e| map_sqlx_error("sweep_expired_sessions", e))?;
        if deleted > 0 {
            tracing::info!(deleted, "expired sessions swept");
        }
        Ok(deleted)
    }
}

/// [`AccountStore`] over the `accounts` table.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, input: &NewAccount) -> AuthResult<AuthAccount> {
        let row = AccountRepo::create(
            &self.pool,
            &CreateAccount {
                public_id: input.public_id.as_uuid(),
                first_name: input.first_name.clone(),
                last_name: input.last_name.clone(),
                email: input.email.clone(),
                password_hash: input.password_hash.clone(),
                mobile: input.mobile.clone(),
            },
        )
        .await
        .map_err(|e| map_sqlx_error("create_account", e))?;
        auth_account_from_row(&row)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> AuthResult<Option<AccountCredentials>> {
        let Some(row) = AccountRepo::find_by_email(&self.pool, email)
            .await
            .map_err(|e| map_sqlx_error("find_account_by_email", e))?
        else {
            return Ok(None);
        };
        Ok(Some(AccountCredentials {
            account: auth_account_from_row(&row)?,
            email: row.email,
            email_verified: row.email_verified,
            password_hash: row.password_hash,
        }))
    }

    async fn find_auth_by_id(&self, id: DbId) -> AuthResult<Option<AuthAccount>> {
        AccountRepo::find_by_id(&self.pool, id)
            .await
            .map_err(|e| map_sqlx_error("find_account_by_id", e))?
            .map(|row| auth_account_from_row(&row))
            .transpose()
    }

    async fn email_or_mobile_taken(&self, email: &str, mobile: Option<&str>) -> AuthResult<bool> {
        AccountRepo::exists_with_email_or_mobile(&self.pool, email, mobile)
            .await
            .map_err(|e| map_sqlx_error("account_uniqueness_check", e))
    }

    async fn record_login(&self, id: DbId, at: EpochMillis) -> AuthResult<()> {
        AccountRepo::record_login(&self.pool, id, at)
            .await
            .map_err(|e| map_sqlx_error("record_login", e))
    }
}

fn session_record_from_row(row: SessionWithAccount) -> AuthResult<SessionRecord> {
    let role: Role = row
        .account_role
        .parse()
        .map_err(|e| AuthError::storage("decode_session_row", e))?;
    Ok(SessionRecord {
        public_id: SessionId::from_uuid(row.public_id),
        token: row.session_token,
        account: AuthAccount {
            id: row.account_id,
            public_id: AccountId::from_uuid(row.account_public_id),
            role,
        },
        device: row.device,
        os: row.os,
        expires_at: row.expires_at,
    })
}

fn auth_account_from_row(row: &Account) -> AuthResult<AuthAccount> {
    let role: Role = row
        .role
        .parse()
        .map_err(|e| AuthError::storage("decode_account_row", e))?;
    Ok(AuthAccount {
        id: row.id,
        public_id: AccountId::from_uuid(row.public_id),
        role,
    })
}

/// Map a sqlx failure into the core taxonomy.
///
/// Unique violations (Postgres code 23505) become `Duplicate` so a token
/// collision or signup race surfaces as a retryable conflict instead of an
/// opaque 5xx; everything else is a storage failure logged with the
/// operation name only.
fn map_sqlx_error(op: &'static str, err: sqlx::Error) -> AuthError {
    match &err {
        sqlx::Error::RowNotFound => AuthError::NotFound,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            AuthError::Duplicate(duplicate_field(db_err.constraint()))
        }
        _ => {
            tracing::error!(op, error = %err, "storage failure");
            AuthError::storage(op, err)
        }
    }
}

/// Name the user-meaningful field behind a unique constraint.
fn duplicate_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("uq_sessions_token") => "session_token",
        Some("uq_accounts_email") => "email",
        Some("uq_accounts_role_mobile") => "mobile",
        Some("uq_sessions_public_id") | Some("uq_accounts_public_id") => "public_id",
        _ => "unique value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert_matches!(
            map_sqlx_error("get_session_with_account", sqlx::Error::RowNotFound),
            AuthError::NotFound
        );
    }

    #[test]
    fn pool_failures_map_to_storage() {
        let err = map_sqlx_error("create_session", sqlx::Error::PoolTimedOut);
        assert_matches!(err, AuthError::Storage { op: "create_session", .. });
        assert!(!err.is_unauthenticated());
    }

    #[test]
    fn constraint_names_resolve_to_fields() {
        assert_eq!(duplicate_field(Some("uq_sessions_token")), "session_token");
        assert_eq!(duplicate_field(Some("uq_accounts_email")), "email");
        assert_eq!(duplicate_field(Some("uq_accounts_role_mobile")), "mobile");
        assert_eq!(duplicate_field(None), "unique value");
    }

    #[test]
    fn corrupt_role_surfaces_as_storage_failure() {
        let row = SessionWithAccount {
            public_id: uuid::Uuid::nil(),
            session_token: "t".into(),
            device: "d".into(),
            os: "o".into(),
            expires_at: 0,
            account_id: 1,
            account_public_id: uuid::Uuid::nil(),
            account_role: "superuser".into(),
        };
        assert_matches!(
            session_record_from_row(row),
            Err(AuthError::Storage { op: "decode_session_row", .. })
        );
    }
}
