use crate::content::{
    assistant, briefing, daily,
    fishing::{self, FishingSpot},
    Apod, ApodClient, DailyBriefing, DailyContent, LlmClient,
};
use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared application state for the content API
#[derive(Clone)]
pub struct ContentAppState {
    pub llm: Option<LlmClient>,
    pub apod: Arc<ApodClient>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct DailyContentResponse {
    pub content: DailyContent,
}

#[derive(Deserialize, Default)]
pub struct RespondRequest {
    #[serde(default)]
    prompt: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct RespondResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FishingFactsResponse {
    pub fact: String,
    pub all_facts: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FishingSpotsResponse {
    pub spots: Vec<FishingSpot>,
}

/// Create content API router
pub fn create_content_router(state: ContentAppState) -> Router {
    Router::new()
        .route("/api/daily-content", get(get_daily_content))
        .route("/api/openai/daily", get(get_daily_briefing))
        .route("/api/openai/respond", post(respond))
        .route("/api/nasa/apod", get(get_apod))
        .route("/api/fishing/facts", get(get_fishing_facts))
        .route("/api/fishing/spots", get(get_fishing_spots))
        .with_state(Arc::new(state))
}

async fn get_daily_content(
    State(state): State<Arc<ContentAppState>>,
) -> Json<DailyContentResponse> {
    let content = daily::daily_content(state.llm.as_ref()).await;
    Json(DailyContentResponse { content })
}

/// GET /api/openai/daily
async fn get_daily_briefing(State(state): State<Arc<ContentAppState>>) -> Json<DailyBriefing> {
    Json(briefing::daily_briefing(state.llm.as_ref()).await)
}

/// POST /api/openai/respond
///
/// An unreadable body is treated like an empty prompt.
async fn respond(
    State(state): State<Arc<ContentAppState>>,
    body: Option<Json<RespondRequest>>,
) -> Json<RespondResponse> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let message = assistant::reply(state.llm.as_ref(), request.prompt.as_deref()).await;
    Json(RespondResponse { message })
}

async fn get_apod(State(state): State<Arc<ContentAppState>>) -> Json<Apod> {
    Json(state.apod.today().await)
}

async fn get_fishing_facts() -> Json<FishingFactsResponse> {
    Json(FishingFactsResponse {
        fact: fishing::random_fact().to_string(),
        all_facts: fishing::FISHING_FACTS.iter().map(|f| f.to_string()).collect(),
    })
}

async fn get_fishing_spots() -> Json<FishingSpotsResponse> {
    Json(FishingSpotsResponse {
        spots: fishing::local_spots(),
    })
}
