use super::openai::{strip_quotes, LlmClient};
use rand::seq::SliceRandom;
use tracing::warn;

/// Answer for a blank prompt.
pub const EMPTY_PROMPT_REPLY: &str = "Ask me something fun and I will bring the stardust!";

const SYSTEM_PROMPT: &str = "You are EzraGPT, a positive, encouraging assistant for a 13-year-old who loves fishing, space, and family. Keep responses under 80 words.";

pub const CANNED_REPLIES: [&str; 4] = [
    "Imagine casting your line into a galaxy full of possibilities. That is you today!",
    "NASA fact: The Sun makes up 99.8% of our solar system's mass. Talk about center stage!",
    "Fishing tip: Fish are more active on cloudy days because the light is softer. Perfect excuse to get outside.",
    "You are the lucky #13 legend. Remember, prime numbers can only be divided by themselves, just like your unique talents.",
];

fn canned_reply() -> String {
    CANNED_REPLIES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(EMPTY_PROMPT_REPLY)
        .to_string()
}

/// Reply to a free-form prompt. Never fails: a missing client or an upstream
/// error yields one of the canned replies.
pub async fn reply(llm: Option<&LlmClient>, prompt: Option<&str>) -> String {
    let Some(prompt) = prompt.map(str::trim).filter(|p| !p.is_empty()) else {
        return EMPTY_PROMPT_REPLY.to_string();
    };

    let Some(llm) = llm else {
        return canned_reply();
    };

    match llm.respond(SYSTEM_PROMPT, prompt, 0.7).await {
        Ok(text) => strip_quotes(&text).to_string(),
        Err(e) => {
            warn!(error = %e, "Assistant reply failed, using a canned reply");
            canned_reply()
        }
    }
}
