use crate::config::DashboardConfig;
use axum::{extract::State, response::Json, routing::get, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One integration as shown on the connections page
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub connected: bool,
    pub last_checked: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ConnectionsResponse {
    pub connections: Vec<ConnectionStatus>,
}

fn entry(
    id: &str,
    name: &str,
    description: &str,
    connected: bool,
    action: Option<&str>,
) -> ConnectionStatus {
    ConnectionStatus {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        connected,
        last_checked: "just now".to_string(),
        action: action.map(str::to_string),
    }
}

/// Integration overview. "Connected" means configured.
pub fn connection_statuses(config: &DashboardConfig) -> Vec<ConnectionStatus> {
    vec![
        entry(
            "supabase",
            "Supabase Auth",
            "Secure login with Google, Apple, or email.",
            config.session.is_configured(),
            Some("View credentials"),
        ),
        entry(
            "spotify",
            "Spotify API",
            "OAuth music playback using your own playlists.",
            config.spotify.is_configured(),
            Some("Connect account"),
        ),
        entry(
            "openai",
            "OpenAI",
            "Generates jokes, facts, and affirmation summaries.",
            config.openai.api_key.is_some(),
            None,
        ),
        entry(
            "nasa",
            "NASA APOD",
            "Astronomy Photo of the Day for cosmic backgrounds.",
            config.nasa.api_key.is_some(),
            None,
        ),
        entry(
            "ifttt",
            "IFTTT Automations",
            "Triggers NASA wallpaper updates and family message blasts.",
            config.ifttt.webhook_key.is_some(),
            Some("Open automation recipes"),
        ),
    ]
}

/// Create connections API router
pub fn create_connections_router(config: Arc<DashboardConfig>) -> Router {
    Router::new()
        .route("/api/connections/status", get(get_connections))
        .with_state(config)
}

async fn get_connections(State(config): State<Arc<DashboardConfig>>) -> Json<ConnectionsResponse> {
    Json(ConnectionsResponse {
        connections: connection_statuses(&config),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconfigured_dashboard() {
        let statuses = connection_statuses(&DashboardConfig::default());
        let ids: Vec<_> = statuses.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["supabase", "spotify", "openai", "nasa", "ifttt"]);
        assert!(statuses.iter().all(|s| !s.connected));
        assert!(statuses.iter().all(|s| s.last_checked == "just now"));
    }

    #[test]
    fn test_configured_integrations() {
        let mut config = DashboardConfig::default();
        config.openai.api_key = Some("sk-test".to_string());
        config.spotify.client_id = Some("cid".to_string());
        config.spotify.client_secret = Some("secret".to_string());

        let statuses = connection_statuses(&config);
        let connected: Vec<_> = statuses
            .iter()
            .filter(|s| s.connected)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(connected, ["spotify", "openai"]);
    }

    #[test]
    fn test_action_omitted_when_absent() {
        let json = serde_json::to_value(connection_statuses(&DashboardConfig::default())).unwrap();
        assert_eq!(json[1]["action"], "Connect account");
        assert_eq!(json[1]["lastChecked"], "just now");
        assert!(json[2].get("action").is_none());
    }
}
