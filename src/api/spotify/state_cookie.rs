//! CSRF state nonce carried in a short-lived cookie.
//!
//! The nonce is issued when the authorization URL is built and must come back
//! unchanged as the callback's `state`. The cookie is cleared on every
//! callback, whatever the outcome, so a nonce is good for one attempt.

use crate::auth::cookie_value;
use axum::http::HeaderMap;
use uuid::Uuid;

pub const STATE_COOKIE: &str = "spotify_oauth_state";

/// Lifetime of an issued nonce
pub const STATE_MAX_AGE_SECONDS: i64 = 60 * 10;

/// Fresh random nonce (UUID v4)
pub fn issue_state() -> String {
    Uuid::new_v4().to_string()
}

/// `Set-Cookie` value storing `state`.
pub fn set_cookie(state: &str, secure: bool) -> String {
    cookie_header(state, STATE_MAX_AGE_SECONDS, secure)
}

/// `Set-Cookie` value removing the nonce.
pub fn clear_cookie(secure: bool) -> String {
    cookie_header("", 0, secure)
}

fn cookie_header(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        STATE_COOKIE, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Nonce stored in the request's cookies, if any.
pub fn stored_state(headers: &HeaderMap) -> Option<String> {
    cookie_value(headers, STATE_COOKIE).filter(|v| !v.is_empty())
}

/// Both sides present and identical.
pub fn state_matches(stored: Option<&str>, returned: Option<&str>) -> bool {
    match (stored, returned) {
        (Some(stored), Some(returned)) => !stored.is_empty() && stored == returned,
        _ => false,
    }
}
