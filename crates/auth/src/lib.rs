//! Session-based authentication core.
//!
//! The pieces, bottom-up:
//!
//! - [`token`] -- opaque bearer session tokens (generation + syntax check).
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`store`] -- the [`store::SessionStore`] / [`store::AccountStore`]
//!   traits plus Postgres and in-memory implementations.
//! - [`authority`] -- session issuance, expiry policy, validation, and
//!   revocation; the per-request validation contract lives here too.
//! - [`service`] -- signup, login, and email-availability operations.
//! - [`config`] / [`cookie`] -- deployment-mode TTL policy and the cookie
//!   descriptor handed to the transport layer.

pub mod authority;
pub mod config;
pub mod cookie;
pub mod password;
pub mod service;
pub mod store;
pub mod token;

pub use authority::{DenyReason, IssuedSession, SessionAuthority, Verdict};
pub use config::{DeployMode, SessionConfig};
pub use cookie::{SameSite, SessionCookie};
pub use service::{AuthService, AuthSuccess, DeviceInfo, SignupRequest};
pub use store::{AccountStore, AuthAccount, SessionRecord, SessionStore};
