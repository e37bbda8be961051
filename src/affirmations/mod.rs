//! Per-owner affirmation log.

mod store;

pub use store::AffirmationStore;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entries kept (and listed) per owner
pub const MAX_ENTRIES: usize = 20;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AffirmationEntry {
    pub id: String,
    pub message: String,
    pub summary: String,
    pub created_at: String,
}

impl AffirmationEntry {
    pub fn new(message: &str, summary: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.to_string(),
            summary: summary.to_string(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Shown when an owner has no entries yet.
    pub fn welcome() -> Self {
        Self {
            id: "welcome".to_string(),
            message: "I am grateful for my family and the adventures we share.".to_string(),
            summary: "Grateful for family adventures".to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
