//! Connection status: load, refresh if needed, then query the Web API.
//!
//! Every failure degrades to [`SpotifyStatus::disconnected`]; nothing from an
//! upstream call reaches the caller verbatim.

use super::exchange::refresh_access_token;
use super::web_api::{fetch_profile, fetch_top_tracks, SpotifyProfile, SpotifyTrack};
use super::SpotifyAppState;
use crate::credentials::Credentials;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Label used when the profile has neither a display name nor an email
const FALLBACK_DISPLAY_NAME: &str = "Spotify friend";

/// Link used when a track has no Spotify URL
const FALLBACK_EXTERNAL_URL: &str = "#";

/// Status response body
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyStatus {
    pub connected: bool,
    pub tracks: Vec<TopTrack>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced: Option<String>,
}

impl SpotifyStatus {
    pub fn disconnected() -> Self {
        Self {
            connected: false,
            tracks: Vec::new(),
            display_name: None,
            last_synced: None,
        }
    }
}

/// A top track reduced to what the dashboard shows
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopTrack {
    pub id: String,
    pub name: String,
    /// Artist names joined with ", "
    pub artists: String,
    /// First album image, or empty
    pub album_art: String,
    pub external_url: String,
}

impl From<SpotifyTrack> for TopTrack {
    fn from(track: SpotifyTrack) -> Self {
        let artists = track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let album_art = track
            .album
            .and_then(|album| album.images.into_iter().next())
            .map(|image| image.url)
            .unwrap_or_default();
        let external_url = track
            .external_urls
            .and_then(|urls| urls.spotify)
            .unwrap_or_else(|| FALLBACK_EXTERNAL_URL.to_string());

        Self {
            id: track.id,
            name: track.name,
            artists,
            album_art,
            external_url,
        }
    }
}

fn display_name(profile: SpotifyProfile) -> String {
    profile
        .display_name
        .filter(|n| !n.trim().is_empty())
        .or(profile.email)
        .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string())
}

/// Build the status for one owner. Never fails.
pub async fn load_status(state: &SpotifyAppState, owner_id: &str) -> SpotifyStatus {
    let credentials = match state.credential_store.get(owner_id) {
        Ok(Some(credentials)) => credentials,
        Ok(None) => {
            debug!(owner_id = %owner_id, "No Spotify credentials stored");
            return SpotifyStatus::disconnected();
        }
        Err(e) => {
            error!(owner_id = %owner_id, error = %e, "Failed to load Spotify credentials");
            return SpotifyStatus::disconnected();
        }
    };

    let Some(access_token) = current_access_token(state, owner_id, credentials).await else {
        return SpotifyStatus::disconnected();
    };

    let http = &state.http;
    let api_url = state.provider.api_url.as_str();
    let result = tokio::try_join!(
        fetch_profile(http, api_url, &access_token),
        fetch_top_tracks(http, api_url, &access_token),
    );

    match result {
        Ok((profile, tracks)) => SpotifyStatus {
            connected: true,
            tracks: tracks.into_iter().map(TopTrack::from).collect(),
            display_name: Some(display_name(profile)),
            last_synced: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        },
        Err(e) => {
            warn!(owner_id = %owner_id, error = %e, "Spotify API request failed");
            SpotifyStatus::disconnected()
        }
    }
}

/// Access token usable right now, refreshing first when it is near expiry.
///
/// `None` means the connection is broken for this request.
async fn current_access_token(
    state: &SpotifyAppState,
    owner_id: &str,
    credentials: Credentials,
) -> Option<String> {
    let now = Utc::now();
    if !credentials.needs_refresh(now) {
        return Some(credentials.access_token);
    }

    debug!(owner_id = %owner_id, expires_at = %credentials.expires_at, "Access token near expiry");

    let grant = match refresh_access_token(&state.http, &state.provider, &credentials.refresh_token)
        .await
    {
        Ok(grant) => grant,
        Err(e) => {
            error!(owner_id = %owner_id, error = %e, "Spotify token refresh failed");
            return None;
        }
    };

    let refreshed = grant.refreshed(&credentials, now);

    match state
        .credential_store
        .replace_if_unchanged(owner_id, &credentials.expires_at, &refreshed)
    {
        Ok(true) => {
            info!(owner_id = %owner_id, expires_at = %refreshed.expires_at, "Spotify token refreshed");
            Some(refreshed.access_token)
        }
        Ok(false) => {
            // Another request refreshed (or the owner disconnected) first.
            debug!(owner_id = %owner_id, "Stored credentials changed during refresh, re-reading");
            match state.credential_store.get(owner_id) {
                Ok(Some(winner)) => Some(winner.access_token),
                Ok(None) => None,
                Err(e) => {
                    error!(owner_id = %owner_id, error = %e, "Failed to re-read Spotify credentials");
                    None
                }
            }
        }
        Err(e) => {
            // The new token is still valid for this request.
            error!(owner_id = %owner_id, error = %e, "Failed to persist refreshed Spotify token");
            Some(refreshed.access_token)
        }
    }
}
