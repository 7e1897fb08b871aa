//! Repository for the `accounts` table.

use gatehouse_core::types::{DbId, EpochMillis};
use sqlx::PgPool;

use crate::models::account::{Account, CreateAccount};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, public_id, first_name, last_name, email, email_verified, \
                        role, password_hash, mobile, last_login_at, created_at, updated_at";

/// Provides CRUD operations for accounts.
pub struct AccountRepo;

impl AccountRepo {
    /// Insert a new account, returning the created row.
    ///
    /// A duplicate email (or a duplicate `(role, mobile)` pair) surfaces as
    /// a unique-constraint violation from the backend.
    pub async fn create(pool: &PgPool, input: &CreateAccount) -> Result<Account, sqlx::Error> {
        let query = format!(
            "INSERT INTO accounts (public_id, first_name, last_name, email, password_hash, mobile, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&query)
            .bind(input.public_id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.mobile)
            .bind(now_ms())
            .fetch_one(pool)
            .await
    }

    /// Find an account by email (emails are stored lowercased).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE email = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an account by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Account>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM accounts WHERE id = $1");
        sqlx::query_as::<_, Account>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Signup pre-check: does any account already use this email, or this
    /// mobile number when one was supplied?
    pub async fn exists_with_email_or_mobile(
        pool: &PgPool,
        email: &str,
        mobile: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(id) FROM accounts
             WHERE email = $1 OR ($2::varchar IS NOT NULL AND mobile = $2)",
        )
        .bind(email)
        .bind(mobile)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// Stamp `last_login_at` after a successful authentication.
    pub async fn record_login(
        pool: &PgPool,
        id: DbId,
        at: EpochMillis,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE accounts SET last_login_at = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(at)
            .bind(now_ms())
            .execute(pool)
            .await?;
        Ok(())
    }
}

fn now_ms() -> EpochMillis {
    chrono::Utc::now().timestamp_millis()
}
