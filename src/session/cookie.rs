//! Session cookie parsing and `Set-Cookie` construction.

use axum::http::{header, HeaderMap};

use crate::config::SessionConfig;

/// How the session cookie is named and scoped.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    name: String,
    secure: bool,
    max_age_secs: u64,
}

impl CookieSettings {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.cookie_secure,
            max_age_secs: config.ttl_secs,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Set-Cookie` value binding the browser to `session_id`.
    pub fn session_cookie(&self, session_id: &str) -> String {
        self.build(session_id, self.max_age_secs)
    }

    /// `Set-Cookie` value that makes the browser drop the session cookie.
    pub fn expired_cookie(&self) -> String {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
            self.name, value, max_age
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Find a cookie value by name across all `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn settings(secure: bool) -> CookieSettings {
        CookieSettings::from_config(&SessionConfig {
            cookie_secure: secure,
            ttl_secs: 3600,
            ..SessionConfig::default()
        })
    }

    #[test]
    fn test_session_cookie() {
        let cookie = settings(false).session_cookie("abc");
        assert_eq!(cookie, "xero_session=abc; HttpOnly; Path=/; SameSite=Lax; Max-Age=3600");

        let secure = settings(true).session_cookie("abc");
        assert!(secure.ends_with("; Secure"));
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = settings(false).expired_cookie();
        assert!(cookie.starts_with("xero_session=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark; xero_session=id-1"));
        headers.append(header::COOKIE, HeaderValue::from_static("other=1"));

        assert_eq!(read_cookie(&headers, "xero_session").as_deref(), Some("id-1"));
        assert_eq!(read_cookie(&headers, "other").as_deref(), Some("1"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_read_cookie_ignores_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("xero_session="));
        assert_eq!(read_cookie(&headers, "xero_session"), None);
    }
}
