//! Per-owner Spotify credential records.
//!
//! One record per owner, upserted on a completed authorization handshake and
//! replaced whenever a refresh succeeds. Tokens are sealed with AES-256-GCM
//! before they reach SQLite.
//!
//! ```no_run
//! use homebase::credentials::{CredentialStore, Credentials};
//! use chrono::{Duration, Utc};
//!
//! # fn main() -> anyhow::Result<()> {
//! let key = std::env::var("HOMEBASE_ENCRYPTION_KEY")?;
//! let store = CredentialStore::new("homebase.db", &key)?;
//!
//! store.upsert("owner-1", &Credentials {
//!     access_token: "AT1".to_string(),
//!     refresh_token: "RT1".to_string(),
//!     expires_at: Utc::now() + Duration::seconds(3600),
//!     granted_scope: Some("user-top-read".to_string()),
//! })?;
//!
//! if let Some(creds) = store.get("owner-1")? {
//!     println!("expires at {}", creds.expires_at);
//! }
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

mod encryption;
mod storage;

pub use encryption::TokenCipher;
pub use storage::CredentialStore;

/// Access tokens expiring within this window are refreshed before use.
pub const REFRESH_LEEWAY_SECONDS: i64 = 60;

/// Stored Spotify credentials for one owner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    /// Short-lived bearer token for the Web API
    pub access_token: String,

    /// Long-lived token used only against the token endpoint; may rotate
    pub refresh_token: String,

    /// When `access_token` stops being accepted (UTC)
    pub expires_at: DateTime<Utc>,

    /// Space-delimited scopes granted at authorization time
    pub granted_scope: Option<String>,
}

impl Credentials {
    /// True when the access token is expired or expires within the leeway.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now + Duration::seconds(REFRESH_LEEWAY_SECONDS)
    }
}
