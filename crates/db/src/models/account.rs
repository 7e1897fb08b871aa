//! Account row model and DTOs.

use gatehouse_core::types::{DbId, EpochMillis};
use sqlx::FromRow;
use uuid::Uuid;

/// Full account row from the `accounts` table.
///
/// Contains the password hash -- this struct must never cross the service
/// boundary. Session lookups use [`crate::models::session::SessionWithAccount`],
/// which carries only the minimal projection.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    pub id: DbId,
    pub public_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub email_verified: bool,
    pub role: String,
    pub password_hash: String,
    pub mobile: Option<String>,
    pub last_login_at: Option<EpochMillis>,
    pub created_at: EpochMillis,
    pub updated_at: Option<EpochMillis>,
}

/// DTO for inserting a new account.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub public_id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub mobile: Option<String>,
}
