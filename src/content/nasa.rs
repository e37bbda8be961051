//! Astronomy Photo of the Day, cached in-process.

use crate::config::NasaConfig;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

const DEFAULT_URL: &str =
    "https://images.unsplash.com/photo-1446776811953-b23d57bd21aa?auto=format&fit=crop&w=2000&q=80";
const DEFAULT_TITLE: &str = "NASA Astronomy Photo of the Day";
const DEFAULT_DESCRIPTION: &str =
    "Exploring the cosmos while your dashboard loads fresh inspiration.";

const FALLBACK_URL: &str =
    "https://images.unsplash.com/photo-1462331940025-496dfbfc7564?auto=format&fit=crop&w=2000&q=80";
const FALLBACK_TITLE: &str = "Galactic Fallback";
const FALLBACK_DESCRIPTION: &str =
    "A cosmic background from Unsplash while NASA takes a quick break.";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Apod {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl Apod {
    pub fn fallback() -> Self {
        Self {
            url: FALLBACK_URL.to_string(),
            title: FALLBACK_TITLE.to_string(),
            description: FALLBACK_DESCRIPTION.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ApodResponse {
    url: Option<String>,
    hdurl: Option<String>,
    title: Option<String>,
    explanation: Option<String>,
}

impl From<ApodResponse> for Apod {
    fn from(body: ApodResponse) -> Self {
        Self {
            url: body
                .hdurl
                .or(body.url)
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
            title: body.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            description: body
                .explanation
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        }
    }
}

struct CachedApod {
    apod: Apod,
    fetched_at: DateTime<Utc>,
}

pub struct ApodClient {
    http: reqwest::Client,
    config: NasaConfig,
    cache: RwLock<Option<CachedApod>>,
}

impl ApodClient {
    pub fn new(http: reqwest::Client, config: NasaConfig) -> Self {
        Self {
            http,
            config,
            cache: RwLock::new(None),
        }
    }

    /// Today's picture. Fallbacks are served but never cached.
    pub async fn today(&self) -> Apod {
        let ttl = Duration::seconds(self.config.cache_seconds);
        if let Some(cached) = self.cache.read().await.as_ref() {
            if Utc::now() - cached.fetched_at < ttl {
                return cached.apod.clone();
            }
        }

        match self.fetch().await {
            Ok(apod) => {
                *self.cache.write().await = Some(CachedApod {
                    apod: apod.clone(),
                    fetched_at: Utc::now(),
                });
                apod
            }
            Err(e) => {
                warn!(error = %e, "NASA APOD request failed, serving fallback");
                Apod::fallback()
            }
        }
    }

    async fn fetch(&self) -> Result<Apod> {
        let url = format!(
            "{}/planetary/apod",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .http
            .get(&url)
            .query(&[("api_key", self.config.effective_key())])
            .send()
            .await
            .context("Failed to send APOD request")?;

        if !response.status().is_success() {
            bail!("APOD request failed with status {}", response.status());
        }

        let body: ApodResponse = response
            .json()
            .await
            .context("Failed to parse APOD response")?;

        debug!("APOD fetched");
        Ok(body.into())
    }
}
