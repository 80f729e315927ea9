//! Requirement ticket models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local state of a requirement ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementState {
    /// Not linked to a tracker issue yet.
    #[default]
    Draft,
    /// Linked to a tracker issue.
    Created,
}

impl RequirementState {
    /// Parse from database string representation.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "created" => Self::Created,
            _ => Self::Draft,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Created => "created",
        }
    }
}

/// A stored requirement ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementTicket {
    /// Row id.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Markdown description.
    pub description: String,
    /// Tracker key, once linked.
    pub ticket_key: Option<String>,
    /// Tracker browse URL, once linked.
    pub ticket_url: Option<String>,
    /// Local state.
    pub status: RequirementState,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Input for a new requirement ticket.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequirement {
    /// Title; required.
    pub title: String,
    /// Markdown description.
    #[serde(default)]
    pub description: String,
    /// Tracker key if the issue already exists.
    #[serde(default)]
    pub ticket_key: Option<String>,
    /// Tracker browse URL.
    #[serde(default)]
    pub ticket_url: Option<String>,
}

/// Coarse progress of a linked requirement, derived from the tracker status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementProgress {
    /// To Do, Backlog, Open, New, Reopened, or unknown.
    NotStarted,
    /// Any other workflow status.
    InReview,
    /// Done, Closed, Resolved.
    Completed,
}

impl RequirementProgress {
    /// Maps a tracker workflow status name (case-insensitive).
    #[must_use]
    pub fn from_tracker_status(status: &str) -> Self {
        const NOT_STARTED: [&str; 5] = ["to do", "backlog", "open", "new", "reopened"];
        const COMPLETED: [&str; 3] = ["done", "closed", "resolved"];

        let normalized = status.trim().to_lowercase();
        if NOT_STARTED.contains(&normalized.as_str()) {
            Self::NotStarted
        } else if COMPLETED.contains(&normalized.as_str()) {
            Self::Completed
        } else {
            Self::InReview
        }
    }
}

/// A linked requirement with its upstream state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedRequirement {
    /// Row id.
    pub id: i64,
    /// Title.
    pub title: String,
    /// Tracker key.
    pub ticket_key: String,
    /// Tracker browse URL.
    pub ticket_url: Option<String>,
    /// Mapped progress.
    pub status: RequirementProgress,
    /// Raw tracker status name, when known.
    pub tracker_status: Option<String>,
    /// Assignee display name.
    pub assignee: Option<String>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_mapping() {
        assert_eq!(
            RequirementProgress::from_tracker_status("To Do"),
            RequirementProgress::NotStarted
        );
        assert_eq!(
            RequirementProgress::from_tracker_status(" reopened "),
            RequirementProgress::NotStarted
        );
        assert_eq!(
            RequirementProgress::from_tracker_status("DONE"),
            RequirementProgress::Completed
        );
        assert_eq!(
            RequirementProgress::from_tracker_status("Resolved"),
            RequirementProgress::Completed
        );
        assert_eq!(
            RequirementProgress::from_tracker_status("In Progress"),
            RequirementProgress::InReview
        );
        assert_eq!(
            RequirementProgress::from_tracker_status("Code Review"),
            RequirementProgress::InReview
        );
    }

    #[test]
    fn test_state_parse() {
        assert_eq!(RequirementState::parse("created"), RequirementState::Created);
        assert_eq!(RequirementState::parse("whatever"), RequirementState::Draft);
    }
}
