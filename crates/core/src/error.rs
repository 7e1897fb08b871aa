//! Error taxonomy shared across the session core.
//!
//! Every failure an authentication caller can observe falls into one of
//! these variants. Anything that is not [`AuthError::Duplicate`] or
//! [`AuthError::Storage`] collapses to a uniform "unauthenticated" at the
//! trust boundary; the distinction stays available internally for logging.

use crate::id::IdError;

/// Domain error for the session core.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No session (or account) matches the given key.
    #[error("not found")]
    NotFound,

    /// The session exists but its expiry timestamp has passed.
    #[error("session expired")]
    Expired,

    /// A unique constraint was violated (e.g. session token, account email).
    /// Retryable by the caller; an existing row is never overwritten.
    #[error("duplicate value for {0}")]
    Duplicate(&'static str),

    /// Untrusted input was rejected before any storage access.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// Credentials did not match. Deliberately indistinguishable between
    /// "unknown email" and "wrong password".
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The storage backend failed or timed out. Distinct from any
    /// authentication failure; surfaces as a server-side error.
    #[error("storage failure during {op}")]
    Storage {
        op: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl AuthError {
    /// Wrap a backend failure, tagging it with the operation name so logs
    /// can identify the failing call without exposing row contents.
    pub fn storage(
        op: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AuthError::Storage {
            op,
            source: source.into(),
        }
    }

    /// True for every variant that collapses to "unauthenticated" at the
    /// trust boundary, as opposed to a server-side or conflict failure.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::NotFound
                | AuthError::Expired
                | AuthError::Malformed(_)
                | AuthError::InvalidCredentials
        )
    }
}

impl From<IdError> for AuthError {
    fn from(err: IdError) -> Self {
        AuthError::Malformed(err.to_string())
    }
}

/// Convenience alias used throughout the store and authority layers.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{AccountId, SessionId};

    #[test]
    fn unauthenticated_classification() {
        assert!(AuthError::NotFound.is_unauthenticated());
        assert!(AuthError::Expired.is_unauthenticated());
        assert!(AuthError::InvalidCredentials.is_unauthenticated());
        assert!(AuthError::Malformed("x".into()).is_unauthenticated());
        assert!(!AuthError::Duplicate("email").is_unauthenticated());
        assert!(!AuthError::storage("create_session", std::io::Error::other("down"))
            .is_unauthenticated());
    }

    #[test]
    fn id_errors_become_malformed() {
        let err = AccountId::parse(&SessionId::generate().to_string()).unwrap_err();
        assert!(matches!(AuthError::from(err), AuthError::Malformed(_)));
    }
}
