//! Shared fixtures: a settable clock, in-memory stores, and builders for
//! the authority and service under test.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use gatehouse_auth::config::{DeployMode, SessionConfig};
use gatehouse_auth::service::SignupRequest;
use gatehouse_auth::store::{MemoryAccountStore, MemorySessionStore};
use gatehouse_auth::{AuthService, SessionAuthority};
use gatehouse_core::id::AccountId;
use gatehouse_core::time::Clock;
use gatehouse_core::types::{DbId, EpochMillis, Role};

/// Arbitrary fixed "now" all tests start from.
pub const T0: EpochMillis = 1_700_000_000_000;

/// Development-mode session TTL (1 day).
pub const DEV_TTL_MS: EpochMillis = 86_400_000;

/// A clock the test can move forward at will.
pub struct FixedClock {
    now: AtomicI64,
}

impl FixedClock {
    pub fn at(now: EpochMillis) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now),
        })
    }

    pub fn advance(&self, delta_ms: EpochMillis) {
        self.now.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> EpochMillis {
        self.now.load(Ordering::SeqCst)
    }
}

/// Authority over a shared in-memory session store, in the given mode.
pub fn authority_in_mode(
    mode: DeployMode,
) -> (
    Arc<MemorySessionStore>,
    Arc<FixedClock>,
    SessionAuthority<Arc<MemorySessionStore>>,
) {
    let store = Arc::new(MemorySessionStore::new());
    let clock = FixedClock::at(T0);
    let authority = SessionAuthority::new(
        Arc::clone(&store),
        SessionConfig::new(mode),
        clock.clone() as Arc<dyn Clock>,
    );
    (store, clock, authority)
}

/// Development-mode authority (the default for most tests).
pub fn dev_authority() -> (
    Arc<MemorySessionStore>,
    Arc<FixedClock>,
    SessionAuthority<Arc<MemorySessionStore>>,
) {
    authority_in_mode(DeployMode::Development)
}

/// Full auth service over in-memory account and session stores.
pub fn dev_service() -> (
    Arc<MemoryAccountStore>,
    Arc<MemorySessionStore>,
    Arc<FixedClock>,
    AuthService<Arc<MemoryAccountStore>, Arc<MemorySessionStore>>,
) {
    let accounts = Arc::new(MemoryAccountStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let clock = FixedClock::at(T0);
    let authority = SessionAuthority::new(
        Arc::clone(&sessions),
        SessionConfig::new(DeployMode::Development),
        clock.clone() as Arc<dyn Clock>,
    );
    let service = AuthService::new(Arc::clone(&accounts), authority);
    (accounts, sessions, clock, service)
}

/// A fabricated account projection for authority-level tests.
pub fn test_account(id: DbId) -> gatehouse_auth::AuthAccount {
    gatehouse_auth::AuthAccount {
        id,
        public_id: AccountId::generate(),
        role: Role::User,
    }
}

/// A valid signup request for the given email.
pub fn signup_request(email: &str) -> SignupRequest {
    SignupRequest {
        first_name: "John".to_string(),
        last_name: Some("Doe".to_string()),
        email: email.to_string(),
        password: "correct-horse-battery-staple".to_string(),
        mobile: None,
    }
}
