//! Token cookie parsing and construction.

use axum::http::{header, HeaderMap, HeaderValue};

/// Value of cookie `name` across all `Cookie` headers.
pub fn read<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value storing `token` for `max_age_secs`.
pub fn issue(name: &str, token: &str, max_age_secs: u64, secure: bool) -> Option<HeaderValue> {
    let mut value = format!("{name}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}");
    if secure {
        value.push_str("; Secure");
    }
    HeaderValue::from_str(&value).ok()
}

/// `Set-Cookie` value removing the cookie.
pub fn clear(name: &str, secure: bool) -> Option<HeaderValue> {
    issue(name, "", 0, secure)
}
