//! Session verification against the hosted auth service.

use super::{extract_session_token, TokenError};
use crate::config::SessionConfig;
use anyhow::{bail, Context, Result};
use axum::http::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

/// An authenticated caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    /// Stable user id; the key for every per-user record
    pub owner_id: String,
    pub email: Option<String>,
}

/// `GET /auth/v1/user` response (fields we rely on)
#[derive(Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Resolves request headers to a [`Session`].
///
/// Without session configuration every caller is anonymous.
#[derive(Clone)]
pub struct SessionVerifier {
    http: reqwest::Client,
    config: SessionConfig,
}

impl SessionVerifier {
    pub fn new(http: reqwest::Client, config: SessionConfig) -> Self {
        Self { http, config }
    }

    /// Like [`verify`](Self::verify), but an unreachable auth service is
    /// logged and treated as anonymous.
    pub async fn current(&self, headers: &HeaderMap) -> Option<Session> {
        match self.verify(headers).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Session lookup failed, treating caller as anonymous");
                None
            }
        }
    }

    /// `Ok(None)` for anonymous callers and tokens the auth service rejects;
    /// `Err` when the auth service could not give an answer.
    pub async fn verify(&self, headers: &HeaderMap) -> Result<Option<Session>> {
        let token = match extract_session_token(headers) {
            Ok(token) => token,
            Err(TokenError::Missing) => return Ok(None),
            Err(e) => {
                debug!(error = %e, "Ignoring malformed session token");
                return Ok(None);
            }
        };

        let (Some(base_url), Some(anon_key)) =
            (&self.config.supabase_url, &self.config.anon_key)
        else {
            debug!("Session service not configured, treating caller as anonymous");
            return Ok(None);
        };

        let response = self
            .http
            .get(format!("{}/auth/v1/user", base_url.trim_end_matches('/')))
            .header("apikey", anon_key)
            .bearer_auth(&token)
            .send()
            .await
            .context("Failed to reach session service")?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            s if !s.is_success() => bail!("Session service returned {}", s),
            _ => {
                let user: AuthUser = response
                    .json()
                    .await
                    .context("Failed to parse session user")?;
                Ok(Some(Session {
                    owner_id: user.id,
                    email: user.email,
                }))
            }
        }
    }
}
