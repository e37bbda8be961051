//! SQLite-backed credential store.

use super::encryption::{Sealed, TokenCipher};
use super::Credentials;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Credential records keyed by owner id.
///
/// # Schema
/// ```sql
/// CREATE TABLE spotify_tokens (
///     owner_id            TEXT PRIMARY KEY,
///     access_token        TEXT NOT NULL,   -- sealed
///     access_token_nonce  TEXT NOT NULL,
///     refresh_token       TEXT NOT NULL,   -- sealed
///     refresh_token_nonce TEXT NOT NULL,
///     expires_at          TEXT NOT NULL,   -- RFC 3339, microseconds
///     scope               TEXT,
///     created_at          TEXT NOT NULL,
///     updated_at          TEXT NOT NULL
/// );
/// ```
///
/// The primary key enforces at most one record per owner.
pub struct CredentialStore {
    conn: Mutex<Connection>,
    cipher: TokenCipher,
}

/// Canonical timestamp text. Conditional updates compare this text, so every
/// write must go through here.
fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl CredentialStore {
    /// Creates or opens a credential store.
    ///
    /// `encryption_key` is a base64-encoded 32-byte master key.
    pub fn new<P: AsRef<Path>>(db_path: P, encryption_key: &str) -> Result<Self> {
        let cipher =
            TokenCipher::from_base64_key(encryption_key).context("Invalid encryption key")?;

        let conn = Connection::open(db_path).context("Failed to open credential database")?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS spotify_tokens (
                owner_id TEXT PRIMARY KEY,
                access_token TEXT NOT NULL,
                access_token_nonce TEXT NOT NULL,
                refresh_token TEXT NOT NULL,
                refresh_token_nonce TEXT NOT NULL,
                expires_at TEXT NOT NULL,
                scope TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .context("Failed to create spotify_tokens table")?;

        Ok(Self {
            conn: Mutex::new(conn),
            cipher,
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Credential store lock poisoned"))
    }

    /// Inserts or replaces the record for `owner_id`.
    pub fn upsert(&self, owner_id: &str, credentials: &Credentials) -> Result<()> {
        let access = self
            .cipher
            .seal(&credentials.access_token)
            .context("Failed to encrypt access token")?;
        let refresh = self
            .cipher
            .seal(&credentials.refresh_token)
            .context("Failed to encrypt refresh token")?;
        let now = format_ts(&Utc::now());

        self.conn()?
            .execute(
                r#"
                INSERT INTO spotify_tokens (
                    owner_id,
                    access_token, access_token_nonce,
                    refresh_token, refresh_token_nonce,
                    expires_at, scope, created_at, updated_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
                ON CONFLICT(owner_id) DO UPDATE SET
                    access_token = excluded.access_token,
                    access_token_nonce = excluded.access_token_nonce,
                    refresh_token = excluded.refresh_token,
                    refresh_token_nonce = excluded.refresh_token_nonce,
                    expires_at = excluded.expires_at,
                    scope = excluded.scope,
                    updated_at = excluded.updated_at
                "#,
                params![
                    owner_id,
                    access.ciphertext,
                    access.nonce,
                    refresh.ciphertext,
                    refresh.nonce,
                    format_ts(&credentials.expires_at),
                    credentials.granted_scope,
                    now,
                ],
            )
            .context("Failed to store credentials")?;

        Ok(())
    }

    /// Replaces the tokens for `owner_id` only if the stored expiry still
    /// equals `previous_expires_at`.
    ///
    /// Returns `false` when another writer already replaced the record (or it
    /// was deleted); the caller should re-read instead of overwriting.
    pub fn replace_if_unchanged(
        &self,
        owner_id: &str,
        previous_expires_at: &DateTime<Utc>,
        credentials: &Credentials,
    ) -> Result<bool> {
        let access = self
            .cipher
            .seal(&credentials.access_token)
            .context("Failed to encrypt access token")?;
        let refresh = self
            .cipher
            .seal(&credentials.refresh_token)
            .context("Failed to encrypt refresh token")?;

        let rows = self
            .conn()?
            .execute(
                r#"
                UPDATE spotify_tokens SET
                    access_token = ?2,
                    access_token_nonce = ?3,
                    refresh_token = ?4,
                    refresh_token_nonce = ?5,
                    expires_at = ?6,
                    updated_at = ?7
                WHERE owner_id = ?1 AND expires_at = ?8
                "#,
                params![
                    owner_id,
                    access.ciphertext,
                    access.nonce,
                    refresh.ciphertext,
                    refresh.nonce,
                    format_ts(&credentials.expires_at),
                    format_ts(&Utc::now()),
                    format_ts(previous_expires_at),
                ],
            )
            .context("Failed to update refreshed credentials")?;

        Ok(rows > 0)
    }

    /// Retrieves and decrypts the record for `owner_id`.
    pub fn get(&self, owner_id: &str) -> Result<Option<Credentials>> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT access_token, access_token_nonce,
                       refresh_token, refresh_token_nonce,
                       expires_at, scope
                FROM spotify_tokens
                WHERE owner_id = ?1
                "#,
                params![owner_id],
                StoredRow::from_row,
            )
            .optional()
            .context("Failed to query credentials")?;

        row.map(|r| self.decode(r)).transpose()
    }

    /// Deletes the record for `owner_id`. Returns whether one existed.
    pub fn delete(&self, owner_id: &str) -> Result<bool> {
        let rows = self
            .conn()?
            .execute(
                "DELETE FROM spotify_tokens WHERE owner_id = ?1",
                params![owner_id],
            )
            .context("Failed to delete credentials")?;

        Ok(rows > 0)
    }

    fn decode(&self, row: StoredRow) -> Result<Credentials> {
        let access_token = self
            .cipher
            .open(&row.access)
            .context("Failed to decrypt access token")?;
        let refresh_token = self
            .cipher
            .open(&row.refresh)
            .context("Failed to decrypt refresh token")?;
        let expires_at = DateTime::parse_from_rfc3339(&row.expires_at)
            .context("Failed to parse expires_at timestamp")?
            .with_timezone(&Utc);

        Ok(Credentials {
            access_token,
            refresh_token,
            expires_at,
            granted_scope: row.scope,
        })
    }
}

struct StoredRow {
    access: Sealed,
    refresh: Sealed,
    expires_at: String,
    scope: Option<String>,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            access: Sealed {
                ciphertext: row.get(0)?,
                nonce: row.get(1)?,
            },
            refresh: Sealed {
                ciphertext: row.get(2)?,
                nonce: row.get(3)?,
            },
            expires_at: row.get(4)?,
            scope: row.get(5)?,
        })
    }
}
