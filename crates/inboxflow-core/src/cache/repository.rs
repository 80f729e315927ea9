//! Cache storage repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, warn};

use crate::model::{CacheSnapshot, EmailStatus, ScoreEntry, StatusEntry};
use crate::Result;

/// Repository for message scores and statuses.
#[derive(Debug, Clone)]
pub struct CacheStore {
    pool: SqlitePool,
}

impl CacheStore {
    /// Create a new store with the given database path.
    ///
    /// Creates the database and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn new(database_path: &str) -> Result<Self> {
        let url = format!("sqlite:{database_path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.initialize().await?;
        Ok(store)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS email_scores (
                email_id TEXT PRIMARY KEY NOT NULL,
                score INTEGER NOT NULL,
                visible INTEGER NOT NULL DEFAULT 1,
                scored_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS email_statuses (
                email_id TEXT PRIMARY KEY NOT NULL,
                status TEXT NOT NULL DEFAULT 'pending',
                is_new INTEGER NOT NULL DEFAULT 0,
                ticket_key TEXT,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Load every score and status.
    ///
    /// Never fails: a database error is logged and yields an empty snapshot.
    pub async fn load_all(&self) -> CacheSnapshot {
        match self.try_load_all().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "failed to load cache, continuing with empty cache");
                CacheSnapshot::default()
            }
        }
    }

    async fn try_load_all(&self) -> Result<CacheSnapshot> {
        let score_rows = sqlx::query("SELECT email_id, score, visible, scored_at FROM email_scores")
            .fetch_all(&self.pool)
            .await?;

        let scores: HashMap<String, ScoreEntry> = score_rows
            .iter()
            .filter_map(|row| {
                let scored_at = parse_timestamp(row.get::<&str, _>("scored_at"))?;
                Some((
                    row.get::<String, _>("email_id"),
                    ScoreEntry {
                        score: u8::try_from(row.get::<i64, _>("score").clamp(0, 100)).ok()?,
                        visible: row.get::<bool, _>("visible"),
                        scored_at,
                    },
                ))
            })
            .collect();

        let status_rows = sqlx::query(
            "SELECT email_id, status, is_new, ticket_key, updated_at FROM email_statuses",
        )
        .fetch_all(&self.pool)
        .await?;

        let statuses: HashMap<String, StatusEntry> = status_rows
            .iter()
            .filter_map(|row| Some((row.get::<String, _>("email_id"), row_to_status(row)?)))
            .collect();

        debug!(
            scores = scores.len(),
            statuses = statuses.len(),
            "loaded cache"
        );
        Ok(CacheSnapshot { scores, statuses })
    }

    /// Upsert a batch of scores. Existing rows are overwritten, including
    /// their timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails. Rows written before the
    /// failure stay written.
    pub async fn upsert_scores(&self, entries: &HashMap<String, ScoreEntry>) -> Result<()> {
        for (email_id, entry) in entries {
            sqlx::query(
                r"
                INSERT INTO email_scores (email_id, score, visible, scored_at)
                VALUES (?, ?, ?, ?)
                ON CONFLICT(email_id) DO UPDATE SET
                    score = excluded.score,
                    visible = excluded.visible,
                    scored_at = excluded.scored_at
                ",
            )
            .bind(email_id)
            .bind(i64::from(entry.score))
            .bind(entry.visible)
            .bind(entry.scored_at.to_rfc3339())
            .execute(&self.pool)
            .await?;
        }
        debug!(count = entries.len(), "upserted scores");
        Ok(())
    }

    /// Upsert the workflow state of one message.
    ///
    /// A `None` ticket key keeps the stored key.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn upsert_status(
        &self,
        email_id: &str,
        status: EmailStatus,
        is_new: bool,
        ticket_key: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO email_statuses (email_id, status, is_new, ticket_key, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(email_id) DO UPDATE SET
                status = excluded.status,
                is_new = excluded.is_new,
                ticket_key = COALESCE(excluded.ticket_key, email_statuses.ticket_key),
                updated_at = excluded.updated_at
            ",
        )
        .bind(email_id)
        .bind(status.as_str())
        .bind(is_new)
        .bind(ticket_key)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(email_id, status = %status, "upserted status");
        Ok(())
    }

    /// Set the status of many messages at once, creating missing rows.
    ///
    /// With `clear_ticket_key` the stored key is set to NULL.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn batch_set_status(
        &self,
        email_ids: &[String],
        status: EmailStatus,
        clear_ticket_key: bool,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        for email_id in email_ids {
            sqlx::query(
                r"
                INSERT INTO email_statuses (email_id, status, is_new, ticket_key, updated_at)
                VALUES (?, ?, 0, NULL, ?)
                ON CONFLICT(email_id) DO UPDATE SET
                    status = excluded.status,
                    ticket_key = CASE WHEN ? THEN NULL ELSE email_statuses.ticket_key END,
                    updated_at = excluded.updated_at
                ",
            )
            .bind(email_id)
            .bind(status.as_str())
            .bind(&now)
            .bind(clear_ticket_key)
            .execute(&self.pool)
            .await?;
        }
        debug!(count = email_ids.len(), status = %status, "batch status update");
        Ok(())
    }

    /// Get the workflow state of one message.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_status(&self, email_id: &str) -> Result<Option<StatusEntry>> {
        let row = sqlx::query(
            "SELECT status, is_new, ticket_key, updated_at FROM email_statuses WHERE email_id = ?",
        )
        .bind(email_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(row_to_status))
    }

    #[cfg(test)]
    pub(crate) async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_status(row: &sqlx::sqlite::SqliteRow) -> Option<StatusEntry> {
    let updated_at = parse_timestamp(row.get::<&str, _>("updated_at"))?;
    let ticket_key: Option<String> = row.get("ticket_key");
    Some(StatusEntry {
        status: EmailStatus::parse(row.get::<&str, _>("status")),
        is_new: row.get::<bool, _>("is_new"),
        ticket_key: ticket_key.filter(|k| !k.is_empty()),
        updated_at,
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
