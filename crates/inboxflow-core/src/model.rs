//! Domain models shared by the cache, the reconciliation engine and the
//! workflow actions.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use inboxflow_gmail::MailMessage;
use inboxflow_mime::Language;
use serde::{Deserialize, Serialize};

/// Score assumed for messages the classifier did not rate.
pub const DEFAULT_SCORE: u8 = 50;

/// Days a cached score stays usable.
pub const SCORE_TTL_DAYS: i64 = 7;

/// Lifecycle status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailStatus {
    /// Not handled yet.
    #[default]
    Pending,
    /// A reply was saved.
    Replied,
    /// An issue was created in the tracker.
    JiraCreated,
    /// Done; no further status changes.
    Completed,
}

impl EmailStatus {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "replied" => Self::Replied,
            "jira_created" => Self::JiraCreated,
            "completed" => Self::Completed,
            _ => Self::Pending,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Replied => "replied",
            Self::JiraCreated => "jira_created",
            Self::Completed => "completed",
        }
    }

    /// Whether the status can no longer change.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for EmailStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cached importance judgment for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    /// Importance in `0..=100`.
    pub score: u8,
    /// Whether the message is shown.
    pub visible: bool,
    /// When the score was written.
    pub scored_at: DateTime<Utc>,
}

impl ScoreEntry {
    /// Whether the entry is younger than the freshness window at `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.scored_at < Duration::days(SCORE_TTL_DAYS)
    }
}

/// Cached workflow state for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    /// Lifecycle status.
    pub status: EmailStatus,
    /// Whether the message is still flagged as new.
    pub is_new: bool,
    /// Tracker key of the linked issue.
    pub ticket_key: Option<String>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

/// Everything the cache holds, keyed by message id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheSnapshot {
    /// Scores, including expired ones.
    pub scores: HashMap<String, ScoreEntry>,
    /// Workflow states.
    pub statuses: HashMap<String, StatusEntry>,
}

/// A message merged with its score and workflow state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    /// Provider message id.
    pub id: String,
    /// Sender display name.
    pub from_name: String,
    /// Sender address.
    pub from_email: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body: String,
    /// Detected language.
    pub language: Language,
    /// Short labels.
    pub tags: Vec<String>,
    /// Receive time.
    pub received_at: DateTime<Utc>,
    /// Provider unread flag.
    pub unread: bool,
    /// Resolved importance.
    pub score: u8,
    /// Resolved lifecycle status.
    pub status: EmailStatus,
    /// Whether the message is new to the operator.
    pub is_new: bool,
    /// Linked tracker issue.
    pub ticket_key: Option<String>,
}

impl Email {
    /// Combines a fetched message with its resolved score and state.
    #[must_use]
    pub fn merge(message: MailMessage, score: u8, state: Option<&StatusEntry>) -> Self {
        let (status, is_new, ticket_key) = state.map_or(
            (EmailStatus::Pending, message.unread, None),
            |s| (s.status, s.is_new, s.ticket_key.clone()),
        );

        Self {
            id: message.id,
            from_name: message.from_name,
            from_email: message.from_email,
            subject: message.subject,
            body: message.body,
            language: message.language,
            tags: message.tags,
            received_at: message.received_at,
            unread: message.unread,
            score,
            status,
            is_new,
            ticket_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(unread: bool) -> MailMessage {
        MailMessage {
            id: "m1".into(),
            from_name: "Ann".into(),
            from_email: "ann@example.com".into(),
            subject: "Hi".into(),
            body: "Hello".into(),
            language: Language::English,
            tags: vec!["INBOX".into()],
            received_at: Utc::now(),
            unread,
            default_score: None,
        }
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            EmailStatus::Pending,
            EmailStatus::Replied,
            EmailStatus::JiraCreated,
            EmailStatus::Completed,
        ] {
            assert_eq!(EmailStatus::parse(status.as_str()), status);
        }
        assert_eq!(EmailStatus::parse("bogus"), EmailStatus::Pending);
    }

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        let entry = |days| ScoreEntry {
            score: 10,
            visible: true,
            scored_at: now - Duration::days(days),
        };
        assert!(entry(6).is_fresh(now));
        assert!(!entry(7).is_fresh(now));
        assert!(!entry(30).is_fresh(now));
    }

    #[test]
    fn test_merge_defaults_to_pending_and_unread() {
        let email = Email::merge(message(true), 50, None);
        assert_eq!(email.status, EmailStatus::Pending);
        assert!(email.is_new);
        assert_eq!(email.ticket_key, None);

        let email = Email::merge(message(false), 50, None);
        assert!(!email.is_new);
    }

    #[test]
    fn test_merge_prefers_cached_state() {
        let state = StatusEntry {
            status: EmailStatus::JiraCreated,
            is_new: false,
            ticket_key: Some("SUP-5".into()),
            updated_at: Utc::now(),
        };
        let email = Email::merge(message(true), 80, Some(&state));
        assert_eq!(email.status, EmailStatus::JiraCreated);
        assert!(!email.is_new);
        assert_eq!(email.ticket_key.as_deref(), Some("SUP-5"));
        assert_eq!(email.score, 80);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&EmailStatus::JiraCreated).unwrap_or_default();
        assert_eq!(json, "\"jira_created\"");
    }
}
