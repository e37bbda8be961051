//! Token endpoint calls: authorization-code exchange and refresh.
//!
//! Both calls POST a form body and authenticate the client with HTTP Basic
//! (`client_id:client_secret`). Neither retries; a failure is final for the
//! current request.

use super::provider::SpotifyProvider;
use crate::credentials::Credentials;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tracing::debug;

/// Token endpoint response
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Absent when the provider does not rotate the refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of `access_token` in seconds
    pub expires_in: i64,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenGrant {
    /// Credentials from a first-time code exchange.
    pub fn into_credentials(self, now: DateTime<Utc>) -> Result<Credentials> {
        let refresh_token = self
            .refresh_token
            .ok_or_else(|| anyhow!("Token response did not include a refresh token"))?;

        Ok(Credentials {
            access_token: self.access_token,
            refresh_token,
            expires_at: now + Duration::seconds(self.expires_in),
            granted_scope: self.scope,
        })
    }

    /// Credentials after a refresh. The previous refresh token is kept when
    /// the provider did not issue a new one.
    pub fn refreshed(self, previous: &Credentials, now: DateTime<Utc>) -> Credentials {
        Credentials {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .unwrap_or_else(|| previous.refresh_token.clone()),
            expires_at: now + Duration::seconds(self.expires_in),
            granted_scope: previous.granted_scope.clone(),
        }
    }
}

/// Exchange an authorization code for the first token pair.
pub async fn exchange_code_for_token(
    http: &reqwest::Client,
    provider: &SpotifyProvider,
    code: &str,
) -> Result<TokenGrant> {
    debug!("Exchanging authorization code for token");
    request_token(
        http,
        provider,
        &[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", provider.redirect_uri.as_str()),
        ],
    )
    .await
}

/// Exchange a refresh token for a new access token.
pub async fn refresh_access_token(
    http: &reqwest::Client,
    provider: &SpotifyProvider,
    refresh_token: &str,
) -> Result<TokenGrant> {
    debug!("Refreshing access token");
    request_token(
        http,
        provider,
        &[("grant_type", "refresh_token"), ("refresh_token", refresh_token)],
    )
    .await
}

async fn request_token(
    http: &reqwest::Client,
    provider: &SpotifyProvider,
    form: &[(&str, &str)],
) -> Result<TokenGrant> {
    let client = provider
        .client_credentials()
        .ok_or_else(|| anyhow!("Spotify client credentials missing"))?;

    let response = http
        .post(&provider.token_url)
        .basic_auth(client.client_id, Some(client.client_secret))
        .header("Accept", "application/json")
        .form(form)
        .send()
        .await
        .context("Failed to send token request")?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        bail!("Token request failed with status {}: {}", status, body);
    }

    let grant: TokenGrant = response
        .json()
        .await
        .context("Failed to parse token response")?;

    debug!(
        rotated_refresh_token = grant.refresh_token.is_some(),
        expires_in = grant.expires_in,
        "Token request successful"
    );

    Ok(grant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use mockito::{Matcher, Server};

    fn provider_for(server_url: &str) -> SpotifyProvider {
        let mut config = DashboardConfig::default();
        config.spotify.accounts_url = server_url.to_string();
        config.spotify.client_id = Some("cid".to_string());
        config.spotify.client_secret = Some("secret".to_string());
        SpotifyProvider::from_config(&config)
    }

    #[test]
    fn test_token_grant_deserialization() {
        let json = r#"{
            "access_token": "AT1",
            "token_type": "Bearer",
            "scope": "user-read-email user-top-read",
            "expires_in": 3600,
            "refresh_token": "RT1"
        }"#;

        let grant: TokenGrant = serde_json::from_str(json).unwrap();
        assert_eq!(grant.access_token, "AT1");
        assert_eq!(grant.refresh_token.as_deref(), Some("RT1"));
        assert_eq!(grant.expires_in, 3600);
        assert_eq!(grant.scope.as_deref(), Some("user-read-email user-top-read"));
    }

    #[test]
    fn test_token_grant_requires_lifetime() {
        let json = r#"{"access_token": "AT1"}"#;
        assert!(serde_json::from_str::<TokenGrant>(json).is_err());
    }

    #[test]
    fn test_into_credentials_requires_refresh_token() {
        let grant = TokenGrant {
            access_token: "AT1".to_string(),
            refresh_token: None,
            expires_in: 3600,
            scope: None,
        };
        assert!(grant.into_credentials(Utc::now()).is_err());
    }

    #[test]
    fn test_refreshed_keeps_previous_refresh_token() {
        let now = Utc::now();
        let previous = Credentials {
            access_token: "AT1".to_string(),
            refresh_token: "RT1".to_string(),
            expires_at: now - Duration::seconds(10),
            granted_scope: Some("user-top-read".to_string()),
        };
        let grant = TokenGrant {
            access_token: "AT2".to_string(),
            refresh_token: None,
            expires_in: 3600,
            scope: None,
        };

        let updated = grant.refreshed(&previous, now);
        assert_eq!(updated.access_token, "AT2");
        assert_eq!(updated.refresh_token, "RT1");
        assert_eq!(updated.expires_at, now + Duration::seconds(3600));
        assert_eq!(updated.granted_scope.as_deref(), Some("user-top-read"));
    }

    #[tokio::test]
    async fn test_exchange_sends_basic_auth_and_form() {
        let mut server = Server::new_async().await;
        let provider = provider_for(&server.url());
        let mock = server
            .mock("POST", "/api/token")
            // base64("cid:secret")
            .match_header("authorization", "Basic Y2lkOnNlY3JldA==")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "validcode".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "http://localhost:3000/api/spotify/callback".into(),
                ),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"AT1","refresh_token":"RT1","expires_in":3600}"#)
            .create_async()
            .await;

        let grant = exchange_code_for_token(&reqwest::Client::new(), &provider, "validcode")
            .await
            .unwrap();
        assert_eq!(grant.access_token, "AT1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refresh_sends_refresh_grant() {
        let mut server = Server::new_async().await;
        let provider = provider_for(&server.url());
        let mock = server
            .mock("POST", "/api/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "RT1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"AT2","expires_in":3600}"#)
            .create_async()
            .await;

        let grant = refresh_access_token(&reqwest::Client::new(), &provider, "RT1")
            .await
            .unwrap();
        assert_eq!(grant.access_token, "AT2");
        assert!(grant.refresh_token.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mut server = Server::new_async().await;
        let provider = provider_for(&server.url());
        let _mock = server
            .mock("POST", "/api/token")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .create_async()
            .await;

        let err = refresh_access_token(&reqwest::Client::new(), &provider, "revoked")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("400"));
    }

    #[tokio::test]
    async fn test_missing_client_credentials() {
        let provider = SpotifyProvider::from_config(&DashboardConfig::default());
        let err = refresh_access_token(&reqwest::Client::new(), &provider, "RT1")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("client credentials missing"));
    }
}
