//! Repository for the `sessions` table.
//!
//! The session token is the lookup key on every read and delete; the serial
//! `id` never leaves the database layer.

use gatehouse_core::types::{DbId, EpochMillis};
use sqlx::PgPool;

use crate::models::session::{CreateSession, Session, SessionWithAccount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, public_id, account_id, account_public_id, session_token, \
                        device, os, expires_at, created_at, updated_at";

/// Join projection for the hot validation path: session attributes plus the
/// minimal account fields (internal id, public id, role). The account's
/// password hash is never selected here.
const JOINED_COLUMNS: &str = "s.public_id, s.session_token, s.device, s.os, s.expires_at, \
                               a.id AS account_id, a.public_id AS account_public_id, \
                               a.role AS account_role";

/// Provides CRUD operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    ///
    /// A token collision violates `uq_sessions_token` and surfaces as a
    /// database error; it is never silently swallowed.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (public_id, account_id, account_public_id, session_token,
                                   device, os, expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.public_id)
            .bind(input.account_id)
            .bind(input.account_public_id)
            .bind(&input.session_token)
            .bind(&input.device)
            .bind(&input.os)
            .bind(input.expires_at)
            .bind(now_ms())
            .fetch_one(pool)
            .await
    }

    /// Fetch a session joined with its account's auth projection in a single
    /// round trip. Expiry is NOT checked here; the authority owns that.
    pub async fn find_with_account_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<SessionWithAccount>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM sessions s
             JOIN accounts a ON a.id = s.account_id
             WHERE s.session_token = $1"
        );
        sqlx::query_as::<_, SessionWithAccount>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// List every session belonging to an account, each with the minimal
    /// account projection.
    pub async fn list_for_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<SessionWithAccount>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM sessions s
             JOIN accounts a ON a.id = s.account_id
             WHERE s.account_id = $1
             ORDER BY s.expires_at DESC"
        );
        sqlx::query_as::<_, SessionWithAccount>(&query)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a session by token. Idempotent: deleting an absent token
    /// simply affects zero rows.
    pub async fn delete_by_token(pool: &PgPool, token: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_token = $1")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Snapshot the tokens an account currently holds.
    ///
    /// Bulk revocation reads this list first and then deletes by token, so
    /// the set deleted is exactly the set that existed at the start of the
    /// call. A session created concurrently may survive; accepted race.
    pub async fn list_tokens_for_account(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT session_token FROM sessions WHERE account_id = $1")
                .bind(account_id)
                .fetch_all(pool)
                .await?;
        Ok(rows.into_iter().map(|(token,)| token).collect())
    }

    /// Delete every session in the given token list. Returns the count of
    /// deleted rows.
    pub async fn delete_by_tokens(pool: &PgPool, tokens: &[String]) -> Result<u64, sqlx::Error> {
        if tokens.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM sessions WHERE session_token = ANY($1)")
            .bind(tokens)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Update a session's expiry in place. Returns `true` if a row matched;
    /// the caller decides whether absence is fatal.
    pub async fn update_expiry(
        pool: &PgPool,
        token: &str,
        expires_at: EpochMillis,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sessions SET expires_at = $2, updated_at = $3 WHERE session_token = $1",
        )
        .bind(token)
        .bind(expires_at)
        .bind(now_ms())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every session whose expiry is at or before `now`. Returns the
    /// count of deleted rows.
    pub async fn delete_expired(pool: &PgPool, now: EpochMillis) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn now_ms() -> EpochMillis {
    chrono::Utc::now().timestamp_millis()
}
