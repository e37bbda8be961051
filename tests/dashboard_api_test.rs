// Integration tests for the affirmation, content and connections APIs

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use homebase::affirmations::AffirmationStore;
use homebase::api::{
    create_affirmations_router, create_connections_router, create_content_router,
    AffirmationAppState, ContentAppState,
};
use homebase::auth::SessionVerifier;
use homebase::config::{DashboardConfig, NasaConfig, OpenAiConfig, SessionConfig};
use homebase::content::{ApodClient, DailyContent, LlmClient};
use mockito::{Matcher, Server, ServerGuard};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SESSION_TOKEN: &str = "session-jwt";

async fn mock_session(server: &mut ServerGuard) {
    server
        .mock("GET", "/auth/v1/user")
        .match_header("authorization", format!("Bearer {}", SESSION_TOKEN).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"owner-1","email":"ezra@example.com"}"#)
        .create_async()
        .await;
}

async fn mock_llm(server: &mut ServerGuard, text: &str) {
    server
        .mock("POST", "/responses")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"output": [{"type": "message", "content": [{"type": "output_text", "text": text}]}]})
                .to_string(),
        )
        .create_async()
        .await;
}

fn llm_for(server: &ServerGuard) -> Option<LlmClient> {
    LlmClient::from_config(
        reqwest::Client::new(),
        &OpenAiConfig {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o-mini".to_string(),
            base_url: server.url(),
        },
    )
}

fn affirmations_app(server: &ServerGuard, llm: Option<LlmClient>) -> Router {
    let sessions = SessionVerifier::new(
        reqwest::Client::new(),
        SessionConfig {
            supabase_url: Some(server.url()),
            anon_key: Some("anon-key".to_string()),
        },
    );
    create_affirmations_router(AffirmationAppState {
        store: Arc::new(AffirmationStore::new(":memory:").unwrap()),
        sessions,
        llm,
    })
}

fn content_app(server: &ServerGuard, llm: Option<LlmClient>) -> Router {
    let apod = ApodClient::new(
        reqwest::Client::new(),
        NasaConfig {
            api_key: None,
            base_url: server.url(),
            cache_seconds: 60,
        },
    );
    create_content_router(ContentAppState {
        llm,
        apod: Arc::new(apod),
    })
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value, authed: bool) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if authed {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", SESSION_TOKEN));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_affirmations_welcome_entry_when_empty() {
    let server = Server::new_async().await;
    let app = affirmations_app(&server, None);

    let response = app.oneshot(get("/api/affirmations")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let entries = json["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], "welcome");
    assert_eq!(entries[0]["summary"], "Grateful for family adventures");
}

#[tokio::test]
async fn test_create_affirmation_requires_session() {
    let server = Server::new_async().await;
    let app = affirmations_app(&server, None);

    let response = app
        .oneshot(post_json(
            "/api/affirmations",
            json!({"message": "I am brave."}),
            false,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_affirmation_requires_message() {
    let mut server = Server::new_async().await;
    mock_session(&mut server).await;
    let app = affirmations_app(&server, None);

    let response = app
        .clone()
        .oneshot(post_json("/api/affirmations", json!({"message": "   "}), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Message is required"})
    );

    let response = app
        .oneshot(post_json("/api/affirmations", json!({}), true))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_affirmation_without_llm_uses_message() {
    let mut server = Server::new_async().await;
    mock_session(&mut server).await;
    let app = affirmations_app(&server, None);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/affirmations",
            json!({"message": "  I am brave and kind.  "}),
            true,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["entry"]["message"], "I am brave and kind.");
    assert_eq!(json["entry"]["summary"], "I am brave and kind.");
    assert!(json["entry"]["createdAt"].is_string());

    let list = app
        .oneshot(
            Request::builder()
                .uri("/api/affirmations")
                .header(header::AUTHORIZATION, format!("Bearer {}", SESSION_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let list = body_json(list).await;
    let entries = list["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], json["entry"]["id"]);
}

#[tokio::test]
async fn test_create_affirmation_with_llm_summary() {
    let mut server = Server::new_async().await;
    mock_session(&mut server).await;
    mock_llm(&mut server, "\"Brave heart, kind soul\"").await;
    let llm = llm_for(&server);
    let app = affirmations_app(&server, llm);

    let response = app
        .oneshot(post_json(
            "/api/affirmations",
            json!({"message": "I am brave and kind."}),
            true,
        ))
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["entry"]["summary"], "Brave heart, kind soul");
}

#[tokio::test]
async fn test_daily_content_fallback_without_llm() {
    let server = Server::new_async().await;
    let app = content_app(&server, None);

    let response = app.oneshot(get("/api/daily-content")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["content"],
        serde_json::to_value(DailyContent::fallback()).unwrap()
    );
}

#[tokio::test]
async fn test_daily_content_merges_generated_json() {
    let mut server = Server::new_async().await;
    mock_llm(
        &mut server,
        r#"{"joke":"Why do fish live in salt water? Pepper makes them sneeze."}"#,
    )
    .await;
    let llm = llm_for(&server);
    let app = content_app(&server, llm);

    let json = body_json(app.oneshot(get("/api/daily-content")).await.unwrap()).await;

    assert_eq!(
        json["content"]["joke"],
        "Why do fish live in salt water? Pepper makes them sneeze."
    );
    assert_eq!(
        json["content"]["affirmation"],
        DailyContent::fallback().affirmation
    );
}

#[tokio::test]
async fn test_daily_content_invalid_json_falls_back() {
    let mut server = Server::new_async().await;
    mock_llm(&mut server, "Here are some jokes!").await;
    let llm = llm_for(&server);
    let app = content_app(&server, llm);

    let json = body_json(app.oneshot(get("/api/daily-content")).await.unwrap()).await;

    assert_eq!(json["content"]["joke"], DailyContent::fallback().joke);
}

#[tokio::test]
async fn test_respond_with_blank_prompt() {
    let server = Server::new_async().await;
    let app = content_app(&server, None);

    let response = app
        .oneshot(post_json("/api/openai/respond", json!({"prompt": ""}), false))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "Ask me something fun and I will bring the stardust!"})
    );
}

#[tokio::test]
async fn test_respond_with_llm() {
    let mut server = Server::new_async().await;
    mock_llm(&mut server, "Saturn could float in a giant bathtub!").await;
    let llm = llm_for(&server);
    let app = content_app(&server, llm);

    let response = app
        .oneshot(post_json(
            "/api/openai/respond",
            json!({"prompt": "Tell me a space fact"}),
            false,
        ))
        .await
        .unwrap();

    assert_eq!(
        body_json(response).await["message"],
        "Saturn could float in a giant bathtub!"
    );
}

#[tokio::test]
async fn test_apod_endpoint() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/planetary/apod")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"url":"https://apod.nasa.gov/a.jpg","title":"Orion","explanation":"Stars."}"#)
        .create_async()
        .await;
    let app = content_app(&server, None);

    let json = body_json(app.oneshot(get("/api/nasa/apod")).await.unwrap()).await;

    assert_eq!(
        json,
        json!({"url": "https://apod.nasa.gov/a.jpg", "title": "Orion", "description": "Stars."})
    );
}

#[tokio::test]
async fn test_fishing_endpoints() {
    let server = Server::new_async().await;
    let app = content_app(&server, None);

    let facts = body_json(app.clone().oneshot(get("/api/fishing/facts")).await.unwrap()).await;
    let all = facts["allFacts"].as_array().unwrap();
    assert_eq!(all.len(), 10);
    assert!(all.contains(&facts["fact"]));

    let spots = body_json(app.oneshot(get("/api/fishing/spots")).await.unwrap()).await;
    let spots = spots["spots"].as_array().unwrap();
    assert_eq!(spots.len(), 4);
    assert_eq!(spots[3]["name"], "Fort Loudoun Lake");
}

#[tokio::test]
async fn test_connections_status() {
    let mut config = DashboardConfig::default();
    config.nasa.api_key = Some("nasa-key".to_string());
    let app = create_connections_router(Arc::new(config));

    let json = body_json(app.oneshot(get("/api/connections/status")).await.unwrap()).await;
    let connections = json["connections"].as_array().unwrap();

    assert_eq!(connections.len(), 5);
    let nasa = connections.iter().find(|c| c["id"] == "nasa").unwrap();
    assert_eq!(nasa["connected"], true);
    assert_eq!(nasa["lastChecked"], "just now");
    let spotify = connections.iter().find(|c| c["id"] == "spotify").unwrap();
    assert_eq!(spotify["connected"], false);
    assert_eq!(spotify["action"], "Connect account");
}

#[tokio::test]
async fn test_daily_briefing_fallback_without_llm() {
    let server = Server::new_async().await;
    let app = content_app(&server, None);

    let response = app.oneshot(get("/api/openai/daily")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["joke"],
        "Why did the fish blush? Because it saw the ocean's bottom!"
    );
    assert_eq!(json["birthdayTwins"].as_array().unwrap().len(), 2);
    assert!(json["generatedAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn test_daily_briefing_from_llm_is_stamped() {
    let mut server = Server::new_async().await;
    let generation = server
        .mock("POST", "/responses")
        .match_body(Matcher::PartialJson(json!({"model": "gpt-4o-mini"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"output": [{"type": "message", "content": [{"type": "output_text", "text":
                json!({
                    "joke": "What do planets read? Comet books.",
                    "funFact13": "13 is a Fibonacci number.",
                    "fishingFact": "Crappie bite best near brush piles.",
                    "newsHeadline": "Kids build a rover in Knoxville.",
                    "affirmation": "You shine bright.",
                    "birthdayTwins": [{"name": "Someone", "description": "Also awesome."}]
                }).to_string()
            }]}]})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let llm = llm_for(&server);
    let app = content_app(&server, llm);

    let before = chrono::Utc::now() - chrono::Duration::seconds(1);
    let json = body_json(app.oneshot(get("/api/openai/daily")).await.unwrap()).await;

    generation.assert_async().await;
    assert_eq!(json["joke"], "What do planets read? Comet books.");
    assert_eq!(json["newsHeadline"], "Kids build a rover in Knoxville.");
    assert_eq!(json["birthdayTwins"][0]["description"], "Also awesome.");
    let generated_at =
        chrono::DateTime::parse_from_rfc3339(json["generatedAt"].as_str().unwrap()).unwrap();
    assert!(generated_at >= before);
}

#[tokio::test]
async fn test_daily_briefing_llm_failure_falls_back() {
    let mut server = Server::new_async().await;
    let _generation = server
        .mock("POST", "/responses")
        .with_status(500)
        .create_async()
        .await;
    let llm = llm_for(&server);
    let app = content_app(&server, llm);

    let json = body_json(app.oneshot(get("/api/openai/daily")).await.unwrap()).await;

    assert_eq!(
        json["fishingFact"],
        "Bass are most active at dawn and dusk when the water is cool and calm."
    );
    assert!(json["generatedAt"].is_string());
}
