//! Spotify Web API calls used by the status endpoint.
//!
//! Responses are parsed into explicit schemas; a body that does not match is
//! an error, the same as a non-2xx status.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Number of top tracks shown on the dashboard
pub const TOP_TRACKS_LIMIT: usize = 5;

/// `GET /me`
#[derive(Debug, Deserialize, PartialEq)]
pub struct SpotifyProfile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// `GET /me/top/tracks`
#[derive(Debug, Deserialize)]
pub struct TopTracksPage {
    #[serde(default)]
    pub items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpotifyTrack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SpotifyArtist>,
    #[serde(default)]
    pub album: Option<SpotifyAlbum>,
    #[serde(default)]
    pub external_urls: Option<ExternalUrls>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpotifyArtist {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpotifyAlbum {
    #[serde(default)]
    pub images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpotifyImage {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: Option<String>,
}

pub async fn fetch_profile(
    http: &reqwest::Client,
    api_url: &str,
    access_token: &str,
) -> Result<SpotifyProfile> {
    let response = http
        .get(format!("{}/me", api_url))
        .bearer_auth(access_token)
        .send()
        .await
        .context("Failed to send profile request")?;

    if !response.status().is_success() {
        bail!("Spotify profile request failed with status {}", response.status());
    }

    response
        .json::<SpotifyProfile>()
        .await
        .context("Failed to parse profile response")
}

pub async fn fetch_top_tracks(
    http: &reqwest::Client,
    api_url: &str,
    access_token: &str,
) -> Result<Vec<SpotifyTrack>> {
    let response = http
        .get(format!("{}/me/top/tracks?limit={}", api_url, TOP_TRACKS_LIMIT))
        .bearer_auth(access_token)
        .send()
        .await
        .context("Failed to send top tracks request")?;

    if !response.status().is_success() {
        bail!(
            "Spotify top tracks request failed with status {}",
            response.status()
        );
    }

    let mut page = response
        .json::<TopTracksPage>()
        .await
        .context("Failed to parse top tracks response")?;
    page.items.truncate(TOP_TRACKS_LIMIT);
    Ok(page.items)
}
