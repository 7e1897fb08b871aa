//! Session row model and DTOs.

use gatehouse_core::types::{DbId, EpochMillis};
use sqlx::FromRow;
use uuid::Uuid;

/// A session row from the `sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: DbId,
    pub public_id: Uuid,
    pub account_id: DbId,
    pub account_public_id: Uuid,
    pub session_token: String,
    pub device: String,
    pub os: String,
    pub expires_at: EpochMillis,
    pub created_at: EpochMillis,
    pub updated_at: Option<EpochMillis>,
}

/// DTO for inserting a new session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub public_id: Uuid,
    pub account_id: DbId,
    pub account_public_id: Uuid,
    pub session_token: String,
    pub device: String,
    pub os: String,
    pub expires_at: EpochMillis,
}

/// Session joined with the minimal account projection used to authorize a
/// request. Deliberately excludes `password_hash` and every other account
/// column the validation path has no business reading.
#[derive(Debug, Clone, FromRow)]
pub struct SessionWithAccount {
    pub public_id: Uuid,
    pub session_token: String,
    pub device: String,
    pub os: String,
    pub expires_at: EpochMillis,
    pub account_id: DbId,
    pub account_public_id: Uuid,
    pub account_role: String,
}
