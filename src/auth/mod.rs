//! Caller identification.
//!
//! A request carries the hosted auth service's access token either as an
//! `Authorization: Bearer` header (API clients) or in the `sb-access-token`
//! cookie (the browser UI). [`SessionVerifier`] turns that token into an
//! owner id.

use axum::http::{header::COOKIE, HeaderMap};

mod session;

pub use session::{Session, SessionVerifier};


/// Cookie holding the browser's session token
pub const SESSION_COOKIE: &str = "sb-access-token";

/// Extract bearer token from HTTP Authorization header
///
/// Expected format: "Authorization: Bearer <token>"
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, TokenError> {
    let auth_header = headers
        .get("authorization")
        .ok_or(TokenError::Missing)?
        .to_str()
        .map_err(|_| TokenError::InvalidFormat)?;

    parse_bearer_token(auth_header)
}

/// Session token from the Authorization header, falling back to the session
/// cookie. A malformed header does not fall through to the cookie.
pub fn extract_session_token(headers: &HeaderMap) -> Result<String, TokenError> {
    match extract_bearer_token(headers) {
        Err(TokenError::Missing) => {
            let raw = cookie_value(headers, SESSION_COOKIE).ok_or(TokenError::Missing)?;
            let token = urlencoding::decode(&raw).map_err(|_| TokenError::InvalidFormat)?;
            let token = token.trim();
            if token.is_empty() {
                return Err(TokenError::Empty);
            }
            Ok(token.to_string())
        }
        other => other,
    }
}

/// Look up a cookie by name across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim_matches('"').to_string())
}

fn parse_bearer_token(header_value: &str) -> Result<String, TokenError> {
    let (scheme, token) = header_value
        .split_once(' ')
        .ok_or(TokenError::InvalidFormat)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::InvalidFormat);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(TokenError::Empty);
    }

    Ok(token.to_string())
}

/// Token extraction errors
#[derive(Debug, PartialEq, Clone)]
pub enum TokenError {
    /// Neither an Authorization header nor a session cookie is present
    Missing,
    /// Not "Bearer <token>", or an undecodable cookie value
    InvalidFormat,
    /// Token is empty string
    Empty,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Missing => write!(f, "Session token not provided"),
            TokenError::InvalidFormat => write!(f, "Invalid session token format"),
            TokenError::Empty => write!(f, "Session token is empty"),
        }
    }
}

impl std::error::Error for TokenError {}
