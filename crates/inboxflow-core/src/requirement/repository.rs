//! Requirement ticket storage repository.

use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use tracing::info;

use super::model::{NewRequirement, RequirementState, RequirementTicket};
use crate::{Error, Result};

/// Repository for requirement tickets.
#[derive(Debug, Clone)]
pub struct RequirementRepository {
    pool: SqlitePool,
}

impl RequirementRepository {
    /// Create a new repository with the given database path.
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

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    /// Create an in-memory repository for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database connection fails or schema creation fails.
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        let repo = Self { pool };
        repo.initialize().await?;
        Ok(repo)
    }

    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS requirement_tickets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                ticket_key TEXT,
                ticket_url TEXT,
                status TEXT NOT NULL DEFAULT 'draft',
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Store a new requirement. It is `created` when a key is given,
    /// `draft` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty title, or a database error.
    pub async fn create(&self, input: &NewRequirement) -> Result<RequirementTicket> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title is required".into()));
        }

        let ticket_key = non_empty(input.ticket_key.as_deref());
        let ticket_url = non_empty(input.ticket_url.as_deref());
        let status = if ticket_key.is_some() {
            RequirementState::Created
        } else {
            RequirementState::Draft
        };
        let created_at = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO requirement_tickets (title, description, ticket_key, ticket_url, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(title)
        .bind(&input.description)
        .bind(ticket_key)
        .bind(ticket_url)
        .bind(status.as_str())
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        info!(id, status = status.as_str(), "requirement ticket stored");

        Ok(RequirementTicket {
            id,
            title: title.to_string(),
            description: input.description.clone(),
            ticket_key: ticket_key.map(str::to_string),
            ticket_url: ticket_url.map(str::to_string),
            status,
            created_at,
        })
    }

    /// All tickets, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<RequirementTicket>> {
        let rows = sqlx::query(
            r"
            SELECT id, title, description, ticket_key, ticket_url, status, created_at
            FROM requirement_tickets
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(row_to_ticket).collect())
    }

    /// Tickets linked to a tracker key, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_linked(&self) -> Result<Vec<RequirementTicket>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|t| t.ticket_key.is_some())
            .collect())
    }

    /// Get one ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get(&self, id: i64) -> Result<Option<RequirementTicket>> {
        let row = sqlx::query(
            r"
            SELECT id, title, description, ticket_key, ticket_url, status, created_at
            FROM requirement_tickets
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().and_then(row_to_ticket))
    }

    /// Link a ticket to a tracker issue, marking it `created`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty key or an unknown id.
    pub async fn link(&self, id: i64, ticket_key: &str, ticket_url: Option<&str>) -> Result<()> {
        let ticket_key = ticket_key.trim();
        if ticket_key.is_empty() {
            return Err(Error::Validation("ticket key is required".into()));
        }

        let updated = sqlx::query(
            r"
            UPDATE requirement_tickets
            SET ticket_key = ?, ticket_url = ?, status = 'created'
            WHERE id = ?
            ",
        )
        .bind(ticket_key)
        .bind(non_empty(ticket_url))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(Error::Validation(format!("requirement ticket {id} not found")));
        }
        Ok(())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn row_to_ticket(row: &SqliteRow) -> Option<RequirementTicket> {
    let created_at = DateTime::parse_from_rfc3339(row.get::<&str, _>("created_at"))
        .ok()?
        .with_timezone(&Utc);

    Some(RequirementTicket {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        ticket_key: row.get("ticket_key"),
        ticket_url: row.get("ticket_url"),
        status: RequirementState::parse(row.get::<&str, _>("status")),
        created_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(title: &str, key: Option<&str>) -> NewRequirement {
        NewRequirement {
            title: title.to_string(),
            description: "details".to_string(),
            ticket_key: key.map(str::to_string),
            ticket_url: key.map(|k| format!("https://tracker.example/browse/{k}")),
        }
    }

    #[tokio::test]
    async fn test_create_sets_state_from_key() {
        let repo = RequirementRepository::in_memory().await.unwrap();

        let draft = repo.create(&input("Export CSV", None)).await.unwrap();
        assert_eq!(draft.status, RequirementState::Draft);
        assert_eq!(draft.ticket_key, None);

        let created = repo.create(&input("Dark mode", Some("SUP-7"))).await.unwrap();
        assert_eq!(created.status, RequirementState::Created);
        assert_eq!(created.ticket_key.as_deref(), Some("SUP-7"));
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let repo = RequirementRepository::in_memory().await.unwrap();
        let err = repo.create(&input("  ", None)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = RequirementRepository::in_memory().await.unwrap();
        repo.create(&input("first", None)).await.unwrap();
        repo.create(&input("second", Some("SUP-2"))).await.unwrap();
        repo.create(&input("third", None)).await.unwrap();

        let titles: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["third", "second", "first"]);

        let linked = repo.list_linked().await.unwrap();
        assert_eq!(linked.len(), 1);
        assert_eq!(linked[0].title, "second");
    }

    #[tokio::test]
    async fn test_link_draft() {
        let repo = RequirementRepository::in_memory().await.unwrap();
        let draft = repo.create(&input("Export CSV", None)).await.unwrap();

        repo.link(draft.id, "SUP-11", Some("https://tracker.example/browse/SUP-11"))
            .await
            .unwrap();

        let ticket = repo.get(draft.id).await.unwrap().unwrap();
        assert_eq!(ticket.status, RequirementState::Created);
        assert_eq!(ticket.ticket_key.as_deref(), Some("SUP-11"));

        assert!(matches!(
            repo.link(999, "SUP-1", None).await,
            Err(Error::Validation(_))
        ));
    }
}
