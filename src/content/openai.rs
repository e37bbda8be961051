//! Minimal client for the OpenAI Responses API.

use crate::config::OpenAiConfig;
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<OutputContent>,
}

#[derive(Deserialize)]
struct OutputContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesBody {
    /// Concatenated `output_text` parts of all message items.
    fn output_text(self) -> String {
        self.output
            .into_iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content)
            .filter(|c| c.content_type == "output_text")
            .filter_map(|c| c.text)
            .collect()
    }
}

/// LLM client; `None` from [`LlmClient::from_config`] when no key is set.
#[derive(Clone)]
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl LlmClient {
    pub fn from_config(http: reqwest::Client, config: &OpenAiConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            http,
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// One system + user exchange. Returns the trimmed output text; an empty
    /// answer is an error.
    pub async fn respond(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let request = ResponsesRequest {
            model: &self.model,
            input: vec![
                InputMessage {
                    role: "system",
                    content: system,
                },
                InputMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        let response = self
            .http
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send LLM request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            bail!("LLM request failed with status {}: {}", status, body);
        }

        let body: ResponsesBody = response
            .json()
            .await
            .context("Failed to parse LLM response")?;

        let text = body.output_text();
        let text = text.trim();
        if text.is_empty() {
            return Err(anyhow!("LLM returned no content"));
        }

        debug!(chars = text.len(), "LLM response received");
        Ok(text.to_string())
    }
}

/// Strip one pair of surrounding double quotes, which models like to add.
pub fn strip_quotes(text: &str) -> &str {
    let text = text.strip_prefix('"').unwrap_or(text);
    text.strip_suffix('"').unwrap_or(text)
}

/// Drop a ```json fence if the model wrapped its JSON in one.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
