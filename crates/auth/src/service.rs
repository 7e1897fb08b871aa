//! Account signup, login, and email-availability operations.
//!
//! Sits in front of the [`AccountStore`] collaborator and the
//! [`SessionAuthority`]: every successful authentication stamps
//! `last_login_at` and ends with an issued session.

use gatehouse_core::error::{AuthError, AuthResult};
use gatehouse_core::id::AccountId;
use validator::Validate;

use crate::authority::SessionAuthority;
use crate::cookie::SessionCookie;
use crate::password::{hash_password, validate_password, verify_password};
use crate::store::{AccountStore, AuthAccount, NewAccount, SessionRecord, SessionStore};

/// Client device metadata attached to each session, derived from the
/// user-agent by the (out-of-scope) transport layer.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub device: String,
    pub os: String,
}

impl Default for DeviceInfo {
    fn default() -> Self {
        Self {
            device: "Unknown".to_string(),
            os: "Unknown".to_string(),
        }
    }
}

/// Signup input, validated before any storage access.
#[derive(Debug, Clone, serde::Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 255))]
    pub first_name: String,
    #[validate(length(min = 1, max = 255))]
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: String,
    /// Length-checked separately against the password policy.
    pub password: String,
    #[validate(length(min = 10, max = 20))]
    pub mobile: Option<String>,
}

/// A successful signup or login: the account's auth projection plus the
/// issued session and its cookie.
#[derive(Debug)]
pub struct AuthSuccess {
    pub account: AuthAccount,
    pub email: String,
    pub email_verified: bool,
    pub session: SessionRecord,
    pub cookie: SessionCookie,
}

/// Signup/login/email-check operations over pluggable stores.
pub struct AuthService<A, S> {
    accounts: A,
    authority: SessionAuthority<S>,
}

impl<A: AccountStore, S: SessionStore> AuthService<A, S> {
    pub fn new(accounts: A, authority: SessionAuthority<S>) -> Self {
        Self {
            accounts,
            authority,
        }
    }

    /// Session lifecycle operations for the transport layer (validation,
    /// renewal, revocation).
    pub fn authority(&self) -> &SessionAuthority<S> {
        &self.authority
    }

    /// Is this email already registered? Lookup is on the lowercased form.
    ///
    /// Existence check only; the credentials row (and its password hash) is
    /// fetched solely by the login path.
    pub async fn check_email(&self, email: &str) -> AuthResult<bool> {
        let email = email.to_lowercase();
        self.accounts.email_or_mobile_taken(&email, None).await
    }

    /// Register a new account and issue its first session.
    ///
    /// Duplicate email or mobile is rejected before any session is created.
    /// The uniqueness pre-check races with concurrent signups; the unique
    /// index behind [`AccountStore::create`] settles the loser with the same
    /// `Duplicate` error.
    pub async fn signup(&self, request: SignupRequest, device: DeviceInfo) -> AuthResult<AuthSuccess> {
        request
            .validate()
            .map_err(|e| AuthError::Malformed(e.to_string()))?;
        validate_password(&request.password).map_err(AuthError::Malformed)?;

        let email = request.email.to_lowercase();
        if self
            .accounts
            .email_or_mobile_taken(&email, request.mobile.as_deref())
            .await?
        {
            return Err(AuthError::Duplicate("email or mobile"));
        }

        let password_hash = hash_password(&request.password)
            .map_err(|e| AuthError::storage("hash_password", e.to_string()))?;

        let account = self
            .accounts
            .create(&NewAccount {
                public_id: AccountId::generate(),
                first_name: request.first_name,
                last_name: request.last_name,
                email: email.clone(),
                password_hash,
                mobile: request.mobile,
            })
            .await?;

        tracing::info!(account = %account.public_id, "account created");

        self.finish_authentication(account, email, false, device)
            .await
    }

    /// Authenticate with email + password and issue a session.
    ///
    /// Unknown email and wrong password are deliberately indistinguishable;
    /// neither creates a session.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        device: DeviceInfo,
    ) -> AuthResult<AuthSuccess> {
        let email = email.to_lowercase();
        let Some(credentials) = self.accounts.find_credentials_by_email(&email).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let password_valid = verify_password(password, &credentials.password_hash)
            .map_err(|e| AuthError::storage("verify_password", e.to_string()))?;
        if !password_valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.finish_authentication(
            credentials.account,
            credentials.email,
            credentials.email_verified,
            device,
        )
        .await
    }

    /// Issue the session and stamp `last_login_at`.
    async fn finish_authentication(
        &self,
        account: AuthAccount,
        email: String,
        email_verified: bool,
        device: DeviceInfo,
    ) -> AuthResult<AuthSuccess> {
        let issued = self
            .authority
            .issue(account, &device.device, &device.os)
            .await?;

        let now = self.authority.clock().now_ms();
        self.accounts.record_login(account.id, now).await?;

        Ok(AuthSuccess {
            account,
            email,
            email_verified,
            session: issued.session,
            cookie: issued.cookie,
        })
    }
}
