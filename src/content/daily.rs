//! Daily dashboard content: a joke, facts, an affirmation and local tips.
//!
//! Generated by the LLM when one is configured, always layered over the
//! built-in content so a partial answer still fills every field.

use super::openai::{strip_code_fence, LlmClient};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

const SYSTEM_PROMPT: &str = "You respond with JSON only.";

const USER_PROMPT: &str = "You are creating a JSON object of uplifting daily content for a 13-year-old named Ezra who loves fishing, space, and family.
Return valid JSON with keys joke, funFact13, fishingFact, affirmation, birthdayTwins (array of objects with name and summary), news (array with title, summary, source), and localFishingSpots (array with name, location, tip).
Keep things positive, concise, and family-friendly.";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyContent {
    pub joke: String,
    pub fun_fact13: String,
    pub fishing_fact: String,
    pub affirmation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nasa: Option<NasaBlurb>,
    pub birthday_twins: Vec<BirthdayTwin>,
    pub news: Vec<NewsItem>,
    pub local_fishing_spots: Vec<FishingTip>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NasaBlurb {
    pub title: String,
    pub description: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BirthdayTwin {
    pub name: String,
    pub summary: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FishingTip {
    pub name: String,
    pub location: String,
    pub tip: String,
}

fn text(s: &str) -> String {
    s.to_string()
}

impl DailyContent {
    /// Built-in content served when generation is unavailable.
    pub fn fallback() -> Self {
        Self {
            joke: text("Why did the astronaut bring fishing gear? Because the Milky Way has the best bass!"),
            fun_fact13: text("There are exactly 13 full moons every few years, perfect for night fishing legends."),
            fishing_fact: text("The Tennessee River system holds more than 230 fish species, making it one of the most diverse in North America."),
            affirmation: text("You are the tide that lifts everyone up. Keep shining, keep smiling, keep reeling in joy."),
            nasa: Some(NasaBlurb {
                title: text("Galactic Fallback"),
                description: text("A dreamy nebula sourced from open imagery as a backup when NASA is busy exploring."),
            }),
            birthday_twins: vec![
                BirthdayTwin {
                    name: text("Emmy Rossum"),
                    summary: text("Actor and singer who balances art and kindness."),
                },
                BirthdayTwin {
                    name: text("Paul Walker"),
                    summary: text("Actor remembered for his adventurous spirit and love of the ocean."),
                },
                BirthdayTwin {
                    name: text("Kiana Madeira"),
                    summary: text("Canadian actor proving that determination leads to big roles."),
                },
            ],
            news: vec![
                NewsItem {
                    title: text("The Week Junior Highlights"),
                    summary: text("Students nationwide design eco-friendly inventions in this week's maker challenge."),
                    source: text("The Week Junior"),
                    url: None,
                },
                NewsItem {
                    title: text("Fishing Report: East TN"),
                    summary: text("Cooling temperatures mean crappie are schooling closer to shore, great for family outings."),
                    source: text("TWRA"),
                    url: None,
                },
                NewsItem {
                    title: text("Space Snapshot"),
                    summary: text("The James Webb Space Telescope captured star-forming clouds 7,000 light-years away."),
                    source: text("NASA"),
                    url: None,
                },
            ],
            local_fishing_spots: vec![
                FishingTip {
                    name: text("Ijams River Landing"),
                    location: text("Knoxville, TN"),
                    tip: text("Perfect for kayak fishing and spotting wildlife along the Tennessee River."),
                },
                FishingTip {
                    name: text("Melton Hill Lake"),
                    location: text("Anderson County, TN"),
                    tip: text("Known for muskie and calm waters. Bring a camera for scenic sunsets."),
                },
                FishingTip {
                    name: text("Watts Bar Reservoir"),
                    location: text("Rhea County, TN"),
                    tip: text("Use spinnerbaits near coves for active bass in the evening."),
                },
            ],
        }
    }

    /// Overlay the top-level keys of a generated JSON object on the fallback
    /// and validate the result. Unknown keys are ignored.
    pub fn merge_generated(generated: &str) -> Result<Self> {
        let generated: Value = serde_json::from_str(strip_code_fence(generated))
            .context("Generated content is not valid JSON")?;
        let Value::Object(generated) = generated else {
            return Err(anyhow!("Generated content is not a JSON object"));
        };

        let mut merged = serde_json::to_value(Self::fallback())
            .context("Failed to serialize fallback content")?;
        if let Value::Object(base) = &mut merged {
            for (key, value) in generated {
                if base.contains_key(&key) || key == "nasa" {
                    base.insert(key, value);
                }
            }
        }

        serde_json::from_value(merged).context("Generated content does not match the schema")
    }
}

/// Today's content: generated if possible, otherwise the fallback.
pub async fn daily_content(llm: Option<&LlmClient>) -> DailyContent {
    let Some(llm) = llm else {
        return DailyContent::fallback();
    };

    let generated = match llm.respond(SYSTEM_PROMPT, USER_PROMPT, 0.7).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Daily content generation failed, serving fallback");
            return DailyContent::fallback();
        }
    };

    DailyContent::merge_generated(&generated).unwrap_or_else(|e| {
        warn!(error = %e, "Generated daily content rejected, serving fallback");
        DailyContent::fallback()
    })
}
