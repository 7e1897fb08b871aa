//! Opaque bearer session tokens.
//!
//! A token is 32 random bytes rendered as 64 lowercase hex characters. It is
//! a bearer credential -- equivalent in sensitivity to a password -- so it is
//! stored as the `sessions.session_token` lookup key and never logged whole.

use rand::RngCore;

/// Raw entropy per token, in bytes.
const SESSION_TOKEN_BYTES: usize = 32;

/// Length of the hex-encoded token string.
pub const SESSION_TOKEN_LEN: usize = SESSION_TOKEN_BYTES * 2;

/// How many leading characters of a token may appear in logs.
const LOG_PREFIX_LEN: usize = 8;

/// Generate a fresh session token (256 bits of OS-seeded randomness).
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    let mut out = String::with_capacity(SESSION_TOKEN_LEN);
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Syntactic check applied to untrusted input before any storage access.
///
/// Anything that fails this cannot possibly be a token we issued.
pub fn looks_like_session_token(input: &str) -> bool {
    input.len() == SESSION_TOKEN_LEN
        && input
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Loggable token prefix. Short enough to be useless to an attacker while
/// still correlating log lines for one session.
pub(crate) fn token_log_prefix(token: &str) -> String {
    token.chars().take(LOG_PREFIX_LEN).collect()
}
