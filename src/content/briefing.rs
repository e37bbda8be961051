//! The home tab's morning briefing: a flat, timestamped subset of the daily
//! content with a single headline instead of a news list.

use super::openai::{strip_code_fence, LlmClient};
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

const SYSTEM_PROMPT: &str = "You are an enthusiastic family assistant building daily dashboard content for a 13-year-old named Ezra. Respond ONLY with JSON.";

const USER_PROMPT: &str = "Generate a JSON object with keys joke, funFact13, fishingFact, newsHeadline, affirmation, birthdayTwins (array of {name, description}) tailored to a 13-year-old fisher and space fan living in East Tennessee. Keep responses upbeat and concise.";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyBriefing {
    pub joke: String,
    pub fun_fact13: String,
    pub fishing_fact: String,
    pub news_headline: String,
    pub birthday_twins: Vec<BriefingTwin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affirmation: Option<String>,
    pub generated_at: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BriefingTwin {
    pub name: String,
    pub description: String,
}

/// Generated fields; the timestamp is always stamped locally.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedBriefing {
    joke: String,
    fun_fact13: String,
    fishing_fact: String,
    news_headline: String,
    birthday_twins: Vec<BriefingTwin>,
    #[serde(default)]
    affirmation: Option<String>,
}

fn timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl DailyBriefing {
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self {
            joke: "Why did the fish blush? Because it saw the ocean's bottom!".to_string(),
            fun_fact13: "There are 13 stripes on the United States flag representing the original colonies.".to_string(),
            fishing_fact: "Bass are most active at dawn and dusk when the water is cool and calm.".to_string(),
            news_headline: "Check The Week Junior for today's top kid-friendly stories.".to_string(),
            birthday_twins: vec![
                BriefingTwin {
                    name: "Jennifer Hudson (1981)".to_string(),
                    description: "Oscar-winning singer and actor who shares your September 12 sparkle.".to_string(),
                },
                BriefingTwin {
                    name: "Andrew Luck (1989)".to_string(),
                    description: "NFL quarterback known for his grit and sportsmanship.".to_string(),
                },
            ],
            affirmation: Some(
                "You are courageous, clever, and every day you make your family proud.".to_string(),
            ),
            generated_at: timestamp(now),
        }
    }

    /// Parse the model's JSON and stamp it. Any missing required key rejects
    /// the whole answer.
    pub fn from_generated(generated: &str, now: DateTime<Utc>) -> Result<Self> {
        let parsed: GeneratedBriefing = serde_json::from_str(strip_code_fence(generated))
            .context("Generated briefing does not match the schema")?;

        Ok(Self {
            joke: parsed.joke,
            fun_fact13: parsed.fun_fact13,
            fishing_fact: parsed.fishing_fact,
            news_headline: parsed.news_headline,
            birthday_twins: parsed.birthday_twins,
            affirmation: parsed.affirmation,
            generated_at: timestamp(now),
        })
    }
}

/// Today's briefing, generated when possible.
pub async fn daily_briefing(llm: Option<&LlmClient>) -> DailyBriefing {
    let now = Utc::now();
    let Some(llm) = llm else {
        return DailyBriefing::fallback(now);
    };

    let generated = match llm.respond(SYSTEM_PROMPT, USER_PROMPT, 0.7).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Daily briefing generation failed, serving fallback");
            return DailyBriefing::fallback(now);
        }
    };

    DailyBriefing::from_generated(&generated, now).unwrap_or_else(|e| {
        warn!(error = %e, "Generated daily briefing rejected, serving fallback");
        DailyBriefing::fallback(now)
    })
}
