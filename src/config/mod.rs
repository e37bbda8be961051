//! Service configuration.
//!
//! Resolved once at startup: an optional TOML file provides the base values,
//! environment variables override them, and the result is injected into every
//! router state. Handlers never read the environment themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Complete service configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub nasa: NasaConfig,
    #[serde(default)]
    pub ifttt: IftttConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Listener and public-facing settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Externally visible origin, used to derive OAuth redirect URIs
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Production mode marks cookies `Secure`
    #[serde(default)]
    pub production: bool,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_public_url() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_url: default_public_url(),
            production: false,
        }
    }
}

/// Local persistence settings
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Base64-encoded 32-byte key for token encryption at rest
    #[serde(default)]
    pub encryption_key: Option<String>,
}

fn default_db_path() -> String {
    "homebase.db".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            encryption_key: None,
        }
    }
}

/// Hosted auth service used to resolve browser sessions
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
}

impl SessionConfig {
    pub fn is_configured(&self) -> bool {
        self.supabase_url.is_some() && self.anon_key.is_some()
    }
}

/// Spotify OAuth client and endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Overrides `<public_url>/api/spotify/callback`
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default = "default_spotify_accounts_url")]
    pub accounts_url: String,
    #[serde(default = "default_spotify_api_url")]
    pub api_url: String,
}

fn default_spotify_accounts_url() -> String {
    "https://accounts.spotify.com".to_string()
}

fn default_spotify_api_url() -> String {
    "https://api.spotify.com/v1".to_string()
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: None,
            accounts_url: default_spotify_accounts_url(),
            api_url: default_spotify_api_url(),
        }
    }
}

impl SpotifyConfig {
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

/// LLM used for daily content, assistant replies and affirmation summaries
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            base_url: default_openai_base_url(),
        }
    }
}

/// Astronomy Photo of the Day feed
#[derive(Debug, Clone, Deserialize)]
pub struct NasaConfig {
    /// Explicit key; the public demo key is used when absent
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_nasa_base_url")]
    pub base_url: String,
    #[serde(default = "default_nasa_cache_seconds")]
    pub cache_seconds: i64,
}

fn default_nasa_base_url() -> String {
    "https://api.nasa.gov".to_string()
}

fn default_nasa_cache_seconds() -> i64 {
    60 * 60 * 12
}

impl Default for NasaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_nasa_base_url(),
            cache_seconds: default_nasa_cache_seconds(),
        }
    }
}

impl NasaConfig {
    pub fn effective_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or("DEMO_KEY")
    }
}

/// Home automation webhooks (only reported, never called)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IftttConfig {
    #[serde(default)]
    pub webhook_key: Option<String>,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl HttpConfig {
    /// Builds the shared outbound client. Every upstream call is bounded by
    /// the configured timeout.
    pub fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(concat!("homebase/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(self.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")
    }
}

impl DashboardConfig {
    /// Apply environment variable overrides on top of file/default values.
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("HOMEBASE_BIND") {
            self.server.bind_addr = v;
        }
        if let Some(v) = get("PUBLIC_URL") {
            self.server.public_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get("HOMEBASE_ENV") {
            self.server.production = v.eq_ignore_ascii_case("production");
        }
        if let Some(v) = get("HOMEBASE_DB_PATH") {
            self.storage.db_path = v;
        }
        if let Some(v) = get("HOMEBASE_ENCRYPTION_KEY") {
            self.storage.encryption_key = Some(v);
        }
        if let Some(v) = get("SUPABASE_URL") {
            self.session.supabase_url = Some(v.trim_end_matches('/').to_string());
        }
        if let Some(v) = get("SUPABASE_ANON_KEY") {
            self.session.anon_key = Some(v);
        }
        if let Some(v) = get("SPOTIFY_CLIENT_ID") {
            self.spotify.client_id = Some(v);
        }
        if let Some(v) = get("SPOTIFY_CLIENT_SECRET") {
            self.spotify.client_secret = Some(v);
        }
        if let Some(v) = get("SPOTIFY_REDIRECT_URI") {
            self.spotify.redirect_uri = Some(v);
        }
        if let Some(v) = get("OPENAI_API_KEY") {
            self.openai.api_key = Some(v);
        }
        if let Some(v) = get("OPENAI_MODEL") {
            self.openai.model = v;
        }
        if let Some(v) = get("NASA_API_KEY") {
            self.nasa.api_key = Some(v);
        }
        if let Some(v) = get("IFTTT_WEBHOOK_KEY") {
            self.ifttt.webhook_key = Some(v);
        }
        if let Some(v) = get("HOMEBASE_HTTP_TIMEOUT_SECONDS") {
            if let Ok(n) = v.parse::<u64>() {
                self.http.timeout_seconds = n;
            }
        }
    }

    /// Redirect URI registered with Spotify for the authorization callback.
    pub fn spotify_redirect_uri(&self) -> String {
        self.spotify.redirect_uri.clone().unwrap_or_else(|| {
            format!(
                "{}/api/spotify/callback",
                self.server.public_url.trim_end_matches('/')
            )
        })
    }

    /// Integrations that will run in degraded mode, with the variables that
    /// would enable them.
    pub fn missing_integrations(&self) -> Vec<(&'static str, &'static str)> {
        let mut missing = Vec::new();
        if !self.session.is_configured() {
            missing.push(("session", "SUPABASE_URL, SUPABASE_ANON_KEY"));
        }
        if !self.spotify.is_configured() {
            missing.push(("spotify", "SPOTIFY_CLIENT_ID, SPOTIFY_CLIENT_SECRET"));
        }
        if self.openai.api_key.is_none() {
            missing.push(("openai", "OPENAI_API_KEY"));
        }
        if self.nasa.api_key.is_none() {
            missing.push(("nasa", "NASA_API_KEY"));
        }
        missing
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &str) -> Result<DashboardConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path))?;
    let config: DashboardConfig =
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path))?;
    Ok(config)
}

/// Resolve the effective configuration: file (if present) then environment.
///
/// An explicitly named file (`HOMEBASE_CONFIG`) must exist; the default
/// `homebase.toml` is optional.
pub fn resolve() -> Result<DashboardConfig> {
    let mut config = match std::env::var("HOMEBASE_CONFIG") {
        Ok(path) => load_config(&path)?,
        Err(_) if std::path::Path::new("homebase.toml").exists() => load_config("homebase.toml")?,
        Err(_) => DashboardConfig::default(),
    };
    config.apply_env();
    Ok(config)
}
