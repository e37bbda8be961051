//! Affirmation log API.
//!
//! Entries are summarized by the LLM when one is configured; otherwise the
//! trimmed message doubles as its own summary.

use super::error::AppError;
use crate::affirmations::{AffirmationEntry, AffirmationStore};
use crate::auth::SessionVerifier;
use crate::content::openai::{strip_quotes, LlmClient};
use axum::{
    extract::State,
    http::HeaderMap,
    response::Json,
    routing::get,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

const SUMMARY_PROMPT: &str = "Summarize affirmations warmly in under 12 words.";

/// Shared application state for the affirmations API
#[derive(Clone)]
pub struct AffirmationAppState {
    pub store: Arc<AffirmationStore>,
    pub sessions: SessionVerifier,
    pub llm: Option<LlmClient>,
}

#[derive(Deserialize, Default)]
pub struct CreateAffirmationRequest {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AffirmationListResponse {
    pub entries: Vec<AffirmationEntry>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AffirmationCreatedResponse {
    pub entry: AffirmationEntry,
}

/// Create affirmations API router
pub fn create_affirmations_router(state: AffirmationAppState) -> Router {
    Router::new()
        .route(
            "/api/affirmations",
            get(list_affirmations).post(create_affirmation),
        )
        .with_state(Arc::new(state))
}

/// GET /api/affirmations
async fn list_affirmations(
    State(state): State<Arc<AffirmationAppState>>,
    headers: HeaderMap,
) -> Result<Json<AffirmationListResponse>, AppError> {
    let entries = match state.sessions.current(&headers).await {
        Some(session) => state.store.recent(&session.owner_id).map_err(|e| {
            error!(owner_id = %session.owner_id, error = %e, "Failed to load affirmations");
            AppError::ServerError("Failed to load affirmations".to_string())
        })?,
        None => Vec::new(),
    };

    let entries = if entries.is_empty() {
        vec![AffirmationEntry::welcome()]
    } else {
        entries
    };

    Ok(Json(AffirmationListResponse { entries }))
}

/// POST /api/affirmations
async fn create_affirmation(
    State(state): State<Arc<AffirmationAppState>>,
    headers: HeaderMap,
    body: Option<Json<CreateAffirmationRequest>>,
) -> Result<Json<AffirmationCreatedResponse>, AppError> {
    let session = state
        .sessions
        .current(&headers)
        .await
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_string()))?;

    let message = body
        .and_then(|Json(request)| request.message)
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::BadRequest("Message is required".to_string()))?;

    let summary = summarize(state.llm.as_ref(), &message).await;
    let entry = AffirmationEntry::new(&message, &summary, Utc::now());

    state.store.insert(&session.owner_id, &entry).map_err(|e| {
        error!(owner_id = %session.owner_id, error = %e, "Failed to store affirmation");
        AppError::ServerError("Failed to store affirmation".to_string())
    })?;

    info!(owner_id = %session.owner_id, entry_id = %entry.id, "Affirmation recorded");
    Ok(Json(AffirmationCreatedResponse { entry }))
}

async fn summarize(llm: Option<&LlmClient>, message: &str) -> String {
    let Some(llm) = llm else {
        return message.to_string();
    };

    match llm.respond(SUMMARY_PROMPT, message, 0.6).await {
        Ok(text) => strip_quotes(&text).to_string(),
        Err(e) => {
            warn!(error = %e, "Affirmation summary failed, keeping the message");
            message.to_string()
        }
    }
}
