//! Session configuration: deployment mode, TTL policy, cookie settings.
//!
//! The deployment mode is chosen once at startup and threaded into the
//! [`crate::SessionAuthority`] constructor -- there is no global flag read
//! at call time.

use gatehouse_core::types::EpochMillis;

/// Session lifetime in development: 1 day.
const DEV_SESSION_TTL_MS: EpochMillis = 24 * 60 * 60 * 1000;

/// Session lifetime in production: 4 weeks.
const PROD_SESSION_TTL_MS: EpochMillis = 28 * 24 * 60 * 60 * 1000;

/// Default session cookie name.
const DEFAULT_COOKIE_NAME: &str = "gatehouse_session";

/// Deployment regime, selecting the session TTL and cookie security flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployMode {
    /// Short sessions, cookies allowed over plain HTTP.
    Development,
    /// Long sessions, `Secure` cookies only.
    Production,
}

/// Configuration for session issuance and cookies.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Deployment regime (dev vs production TTL).
    pub mode: DeployMode,
    /// Name of the session cookie.
    pub cookie_name: String,
}

impl SessionConfig {
    /// Build a config for the given mode with the default cookie name.
    pub fn new(mode: DeployMode) -> Self {
        Self {
            mode,
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Env Var               | Required | Default             |
    /// |-----------------------|----------|---------------------|
    /// | `APP_ENV`             | no       | `development`       |
    /// | `SESSION_COOKIE_NAME` | no       | `gatehouse_session` |
    ///
    /// # Panics
    ///
    /// Panics if `APP_ENV` is set to anything other than `development` or
    /// `production` -- misconfiguration should fail fast at startup.
    pub fn from_env() -> Self {
        let mode = match std::env::var("APP_ENV").as_deref() {
            Ok("production") => DeployMode::Production,
            Ok("development") | Err(_) => DeployMode::Development,
            Ok(other) => panic!("APP_ENV must be 'development' or 'production', got '{other}'"),
        };
        let cookie_name = std::env::var("SESSION_COOKIE_NAME")
            .unwrap_or_else(|_| DEFAULT_COOKIE_NAME.to_string());
        Self { mode, cookie_name }
    }

    /// Absolute session time-to-live for the configured mode.
    pub fn session_ttl_ms(&self) -> EpochMillis {
        match self.mode {
            DeployMode::Development => DEV_SESSION_TTL_MS,
            DeployMode::Production => PROD_SESSION_TTL_MS,
        }
    }

    /// Cookies carry the `Secure` flag only in production.
    pub fn cookie_secure(&self) -> bool {
        self.mode == DeployMode::Production
    }
}
