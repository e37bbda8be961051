//! Dashboard content sources: LLM text, the astronomy picture and the
//! fishing corner. Each has built-in fallbacks so the dashboard always
//! renders.

pub mod assistant;
pub mod briefing;
pub mod daily;
pub mod fishing;
pub mod nasa;
pub mod openai;

pub use briefing::DailyBriefing;
pub use daily::DailyContent;
pub use nasa::{Apod, ApodClient};
pub use openai::LlmClient;
