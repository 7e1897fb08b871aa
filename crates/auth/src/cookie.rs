//! Cookie descriptor handed to the transport layer.
//!
//! The core never touches HTTP; it only describes the cookie (name, value,
//! flags) and lets the caller attach it to a response.

use std::fmt;

use crate::config::SessionConfig;

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    const fn as_str(self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Attributes of the session cookie for one response.
#[derive(Clone)]
pub struct SessionCookie {
    pub name: String,
    /// The bearer token. Redacted from `Debug` output.
    pub value: String,
    pub max_age_secs: i64,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl SessionCookie {
    /// Cookie carrying a freshly issued session token.
    pub fn for_session(config: &SessionConfig, token: String) -> Self {
        Self {
            name: config.cookie_name.clone(),
            value: token,
            max_age_secs: config.session_ttl_ms() / 1000,
            path: "/".to_string(),
            http_only: true,
            secure: config.cookie_secure(),
            same_site: SameSite::Lax,
        }
    }

    /// Blank, immediately expiring cookie used to clear the session on
    /// logout.
    pub fn blank(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            value: String::new(),
            max_age_secs: 0,
            path: "/".to_string(),
            http_only: true,
            secure: config.cookie_secure(),
            same_site: SameSite::Lax,
        }
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_set_cookie(&self) -> String {
        let mut header = format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            self.name,
            self.value,
            self.path,
            self.max_age_secs,
            self.same_site.as_str()
        );
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

// The value is a bearer credential; keep it out of debug logs.
impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("max_age_secs", &self.max_age_secs)
            .field("path", &self.path)
            .field("http_only", &self.http_only)
            .field("secure", &self.secure)
            .field("same_site", &self.same_site)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployMode;

    #[test]
    fn dev_cookie_is_lax_http_only_not_secure() {
        let config = SessionConfig::new(DeployMode::Development);
        let cookie = SessionCookie::for_session(&config, "abc123".into());
        let header = cookie.to_set_cookie();
        assert_eq!(
            header,
            "gatehouse_session=abc123; Path=/; Max-Age=86400; SameSite=Lax; HttpOnly"
        );
    }

    #[test]
    fn production_cookie_carries_secure() {
        let config = SessionConfig::new(DeployMode::Production);
        let cookie = SessionCookie::for_session(&config, "abc123".into());
        assert!(cookie.to_set_cookie().ends_with("; HttpOnly; Secure"));
        assert_eq!(cookie.max_age_secs, 28 * 24 * 60 * 60);
    }

    #[test]
    fn blank_cookie_clears_the_session() {
        let config = SessionConfig::new(DeployMode::Development);
        let cookie = SessionCookie::blank(&config);
        assert!(cookie.value.is_empty());
        assert_eq!(cookie.max_age_secs, 0);
    }

    #[test]
    fn debug_never_prints_the_token() {
        let config = SessionConfig::new(DeployMode::Development);
        let cookie = SessionCookie::for_session(&config, "super-secret-token".into());
        let debug = format!("{cookie:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("<redacted>"));
    }
}
