use super::{AffirmationEntry, MAX_ENTRIES};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite-backed affirmation log, newest first, capped per owner.
pub struct AffirmationStore {
    conn: Mutex<Connection>,
}

impl AffirmationStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path).context("Failed to open affirmation database")?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS affirmations (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                message TEXT NOT NULL,
                summary TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_affirmations_owner
                ON affirmations(owner_id, created_at);
            "#,
        )
        .context("Failed to create affirmations table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("Affirmation store lock poisoned"))
    }

    /// Stores an entry and drops the owner's entries beyond the cap.
    pub fn insert(&self, owner_id: &str, entry: &AffirmationEntry) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO affirmations (id, owner_id, message, summary, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                entry.id,
                owner_id,
                entry.message,
                entry.summary,
                entry.created_at
            ],
        )
        .context("Failed to store affirmation")?;

        tx.execute(
            r#"
            DELETE FROM affirmations
            WHERE owner_id = ?1 AND id NOT IN (
                SELECT id FROM affirmations
                WHERE owner_id = ?1
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?2
            )
            "#,
            params![owner_id, MAX_ENTRIES as i64],
        )
        .context("Failed to prune affirmations")?;

        tx.commit()?;
        Ok(())
    }

    /// Newest entries for `owner_id`, at most [`MAX_ENTRIES`].
    pub fn recent(&self, owner_id: &str) -> Result<Vec<AffirmationEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, message, summary, created_at
            FROM affirmations
            WHERE owner_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2
            "#,
        )?;

        let entries = stmt
            .query_map(params![owner_id, MAX_ENTRIES as i64], |row| {
                Ok(AffirmationEntry {
                    id: row.get(0)?,
                    message: row.get(1)?,
                    summary: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query affirmations")?;

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::NamedTempFile;

    fn store() -> (AffirmationStore, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        (AffirmationStore::new(file.path()).unwrap(), file)
    }

    #[test]
    fn test_newest_first_and_owner_scoped() {
        let (store, _file) = store();
        let base = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();

        let first = AffirmationEntry::new("I am kind.", "Kind", base);
        let second = AffirmationEntry::new("I am patient.", "Patient", base + Duration::minutes(5));
        let other = AffirmationEntry::new("I am loud.", "Loud", base);

        store.insert("owner-a", &first).unwrap();
        store.insert("owner-a", &second).unwrap();
        store.insert("owner-b", &other).unwrap();

        let entries = store.recent("owner-a").unwrap();
        assert_eq!(entries, vec![second, first]);
        assert_eq!(store.recent("owner-b").unwrap(), vec![other]);
        assert!(store.recent("owner-c").unwrap().is_empty());
    }

    #[test]
    fn test_prunes_beyond_cap() {
        let (store, _file) = store();
        let base = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();

        for i in 0..(MAX_ENTRIES + 5) {
            let entry = AffirmationEntry::new(
                &format!("Affirmation {i}"),
                "Summary",
                base + Duration::seconds(i as i64),
            );
            store.insert("owner-a", &entry).unwrap();
        }

        let entries = store.recent("owner-a").unwrap();
        assert_eq!(entries.len(), MAX_ENTRIES);
        assert_eq!(entries[0].message, format!("Affirmation {}", MAX_ENTRIES + 4));
        assert_eq!(entries[MAX_ENTRIES - 1].message, "Affirmation 5");

        let total: i64 = store
            .conn()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM affirmations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(total, MAX_ENTRIES as i64);
    }
}
