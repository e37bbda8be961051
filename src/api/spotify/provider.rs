//! Spotify OAuth endpoints, scopes and client credentials.

use crate::config::DashboardConfig;

/// Permissions requested at authorization time
pub const SCOPES: &[&str] = &[
    "user-read-email",
    "user-read-private",
    "user-top-read",
    "user-read-playback-state",
];

/// Resolved Spotify OAuth settings
#[derive(Clone, Debug)]
pub struct SpotifyProvider {
    /// OAuth authorization endpoint URL
    pub auth_url: String,

    /// OAuth token endpoint URL (code exchange and refresh)
    pub token_url: String,

    /// Web API base URL
    pub api_url: String,

    /// Callback registered with Spotify
    pub redirect_uri: String,

    client_id: Option<String>,
    client_secret: Option<String>,
}

/// Client id and secret, present together
pub struct ClientCredentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

impl SpotifyProvider {
    pub fn from_config(config: &DashboardConfig) -> Self {
        let accounts = config.spotify.accounts_url.trim_end_matches('/');
        Self {
            auth_url: format!("{}/authorize", accounts),
            token_url: format!("{}/api/token", accounts),
            api_url: config.spotify.api_url.trim_end_matches('/').to_string(),
            redirect_uri: config.spotify_redirect_uri(),
            client_id: config.spotify.client_id.clone(),
            client_secret: config.spotify.client_secret.clone(),
        }
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    pub fn client_credentials(&self) -> Option<ClientCredentials<'_>> {
        Some(ClientCredentials {
            client_id: self.client_id.as_deref()?,
            client_secret: self.client_secret.as_deref()?,
        })
    }

    /// Build the authorization URL the browser navigates to.
    pub fn build_auth_url(&self, client_id: &str, state: &str) -> String {
        let scopes = SCOPES.join(" ");
        format!(
            "{}?response_type=code&client_id={}&scope={}&redirect_uri={}&state={}",
            self.auth_url,
            urlencoding::encode(client_id),
            urlencoding::encode(&scopes),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(state)
        )
    }
}
