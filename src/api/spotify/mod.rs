//! Spotify connection flow.
//!
//! Implements the authorization code flow plus the dashboard's status view:
//! 1. UI POSTs /api/spotify/login → `{ url }`, nonce stored in a cookie
//! 2. Browser navigates to Spotify, user authorizes
//! 3. Spotify redirects to /api/spotify/callback with `code` and `state`
//! 4. Nonce checked, code exchanged, tokens upserted for the owner
//! 5. GET /api/spotify/status refreshes near-expiry tokens and returns the
//!    profile name plus top tracks
//!
//! The callback only ever answers with a redirect and the status endpoint
//! only ever answers 200; failures are logged and folded into those shapes.

mod exchange;
mod provider;
mod state_cookie;
mod status;
mod web_api;

pub use provider::{SpotifyProvider, SCOPES};
pub use state_cookie::{STATE_COOKIE, STATE_MAX_AGE_SECONDS};
pub use status::{SpotifyStatus, TopTrack};
pub use web_api::TOP_TRACKS_LIMIT;

use super::error::AppError;
use crate::auth::SessionVerifier;
use crate::credentials::CredentialStore;
use axum::{
    extract::{Query, State},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Json, Redirect, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const SUCCESS_REDIRECT: &str = "/?spotify=success";
const FAILURE_REDIRECT: &str = "/?spotify=error";

/// Shared application state for the Spotify API
#[derive(Clone)]
pub struct SpotifyAppState {
    pub credential_store: Arc<CredentialStore>,
    pub sessions: SessionVerifier,
    pub provider: SpotifyProvider,
    pub http: reqwest::Client,
    /// Mark the state cookie `Secure` (production)
    pub secure_cookies: bool,
}

/// OAuth callback query parameters
#[derive(Deserialize, Default)]
pub struct OAuthCallback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// POST /api/spotify/login response
#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub url: String,
}

/// DELETE /api/spotify/connection response
#[derive(Serialize, Deserialize, Debug)]
pub struct DisconnectResponse {
    pub disconnected: bool,
}

/// Create Spotify API router
pub fn create_spotify_router(state: SpotifyAppState) -> Router {
    Router::new()
        .route("/api/spotify/login", post(spotify_login))
        .route("/api/spotify/callback", get(spotify_callback))
        .route("/api/spotify/status", get(spotify_status))
        .route("/api/spotify/connection", delete(spotify_disconnect))
        .with_state(Arc::new(state))
}

/// POST /api/spotify/login
///
/// Issues a CSRF nonce cookie and returns the authorization URL. The caller
/// navigates there itself.
async fn spotify_login(
    State(state): State<Arc<SpotifyAppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let session = state
        .sessions
        .current(&headers)
        .await
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    let client_id = state.provider.client_id().ok_or_else(|| {
        error!("Spotify login requested but SPOTIFY_CLIENT_ID is not configured");
        AppError::ServerError("Missing SPOTIFY_CLIENT_ID".to_string())
    })?;

    let nonce = state_cookie::issue_state();
    let url = state.provider.build_auth_url(client_id, &nonce);

    info!(owner_id = %session.owner_id, "Issuing Spotify authorization URL");

    Ok((
        [(SET_COOKIE, state_cookie::set_cookie(&nonce, state.secure_cookies))],
        Json(LoginResponse { url }),
    )
        .into_response())
}

/// GET /api/spotify/callback
///
/// Validates and consumes the nonce, exchanges the code and upserts the
/// owner's credentials. Always redirects back to the UI.
async fn spotify_callback(
    State(state): State<Arc<SpotifyAppState>>,
    Query(callback): Query<OAuthCallback>,
    headers: HeaderMap,
) -> Response {
    let stored = state_cookie::stored_state(&headers);
    let target = handle_callback(&state, callback, stored, &headers).await;

    (
        [(SET_COOKIE, state_cookie::clear_cookie(state.secure_cookies))],
        Redirect::temporary(target),
    )
        .into_response()
}

async fn handle_callback(
    state: &SpotifyAppState,
    callback: OAuthCallback,
    stored_state: Option<String>,
    headers: &HeaderMap,
) -> &'static str {
    if let Some(error) = callback.error {
        warn!(error = %error, "Spotify authorization denied");
        return FAILURE_REDIRECT;
    }

    if !state_cookie::state_matches(stored_state.as_deref(), callback.state.as_deref()) {
        warn!(
            has_stored_state = stored_state.is_some(),
            "Spotify callback state mismatch"
        );
        return FAILURE_REDIRECT;
    }

    let Some(code) = callback.code else {
        warn!("Spotify callback missing code");
        return FAILURE_REDIRECT;
    };

    let Some(session) = state.sessions.current(headers).await else {
        warn!("Spotify callback without an active session");
        return FAILURE_REDIRECT;
    };

    if state.provider.client_credentials().is_none() {
        error!("Spotify callback received but client credentials are not configured");
        return FAILURE_REDIRECT;
    }

    let grant = match exchange::exchange_code_for_token(&state.http, &state.provider, &code).await
    {
        Ok(grant) => grant,
        Err(e) => {
            error!(owner_id = %session.owner_id, error = %e, "Spotify token exchange failed");
            return FAILURE_REDIRECT;
        }
    };

    let credentials = match grant.into_credentials(Utc::now()) {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(owner_id = %session.owner_id, error = %e, "Spotify token response unusable");
            return FAILURE_REDIRECT;
        }
    };

    if let Err(e) = state
        .credential_store
        .upsert(&session.owner_id, &credentials)
    {
        error!(owner_id = %session.owner_id, error = %e, "Failed to persist Spotify tokens");
        return FAILURE_REDIRECT;
    }

    info!(
        owner_id = %session.owner_id,
        scope = credentials.granted_scope.as_deref().unwrap_or(""),
        "Spotify connected"
    );
    SUCCESS_REDIRECT
}

/// GET /api/spotify/status
async fn spotify_status(
    State(state): State<Arc<SpotifyAppState>>,
    headers: HeaderMap,
) -> Json<SpotifyStatus> {
    let Some(session) = state.sessions.current(&headers).await else {
        debug!("Spotify status requested without a session");
        return Json(SpotifyStatus::disconnected());
    };

    Json(status::load_status(&state, &session.owner_id).await)
}

/// DELETE /api/spotify/connection
///
/// Forgets the owner's stored tokens. Spotify-side access is left for the
/// user to revoke in their account settings.
async fn spotify_disconnect(
    State(state): State<Arc<SpotifyAppState>>,
    headers: HeaderMap,
) -> Result<Json<DisconnectResponse>, AppError> {
    let session = state
        .sessions
        .current(&headers)
        .await
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    let disconnected = state
        .credential_store
        .delete(&session.owner_id)
        .map_err(|e| {
            error!(owner_id = %session.owner_id, error = %e, "Failed to delete Spotify tokens");
            AppError::ServerError("Failed to disconnect Spotify".to_string())
        })?;

    info!(owner_id = %session.owner_id, disconnected, "Spotify disconnect requested");
    Ok(Json(DisconnectResponse { disconnected }))
}
