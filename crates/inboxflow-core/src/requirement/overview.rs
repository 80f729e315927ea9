//! Upstream progress of linked requirement tickets.

use std::collections::HashMap;

use tracing::warn;

use super::model::{RequirementProgress, TrackedRequirement};
use super::repository::RequirementRepository;
use crate::Result;
use crate::service::Tracker;

/// Linked requirement tickets with their tracker status, newest first.
///
/// When the tracker is not configured or the lookup fails, every ticket is
/// reported as not started with no assignee.
///
/// # Errors
///
/// Returns an error only if the repository query fails.
pub async fn overview(
    repo: &RequirementRepository,
    tracker: &dyn Tracker,
) -> Result<Vec<TrackedRequirement>> {
    let tickets = repo.list_linked().await?;
    if tickets.is_empty() {
        return Ok(Vec::new());
    }

    let statuses = if tracker.is_configured() {
        let keys: Vec<String> = tickets
            .iter()
            .filter_map(|t| t.ticket_key.clone())
            .collect();
        tracker.issue_statuses(&keys).await.unwrap_or_else(|e| {
            warn!(error = %e, "tracker status lookup failed");
            HashMap::new()
        })
    } else {
        HashMap::new()
    };

    Ok(tickets
        .into_iter()
        .filter_map(|ticket| {
            let key = ticket.ticket_key?;
            let upstream = statuses.get(&key);
            Some(TrackedRequirement {
                id: ticket.id,
                title: ticket.title,
                status: upstream.map_or(RequirementProgress::NotStarted, |s| {
                    RequirementProgress::from_tracker_status(&s.status)
                }),
                tracker_status: upstream.map(|s| s.status.clone()),
                assignee: upstream.and_then(|s| s.assignee.clone()),
                ticket_key: key,
                ticket_url: ticket.ticket_url,
                created_at: ticket.created_at,
            })
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::requirement::NewRequirement;
    use crate::testing::FakeTracker;
    use inboxflow_jira::IssueStatus;

    async fn seeded() -> RequirementRepository {
        let repo = RequirementRepository::in_memory().await.unwrap();
        for (title, key) in [("draft", None), ("a", Some("SUP-1")), ("b", Some("SUP-2"))] {
            repo.create(&NewRequirement {
                title: title.into(),
                ticket_key: key.map(str::to_string),
                ..NewRequirement::default()
            })
            .await
            .unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_overview_maps_statuses() {
        let repo = seeded().await;
        let mut tracker = FakeTracker::default();
        tracker.statuses.insert(
            "SUP-1".into(),
            IssueStatus {
                status: "In Progress".into(),
                assignee: Some("Lee".into()),
            },
        );
        tracker.statuses.insert(
            "SUP-2".into(),
            IssueStatus {
                status: "Done".into(),
                assignee: None,
            },
        );

        let rows = overview(&repo, &tracker).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].ticket_key, "SUP-2");
        assert_eq!(rows[0].status, RequirementProgress::Completed);
        assert_eq!(rows[1].status, RequirementProgress::InReview);
        assert_eq!(rows[1].assignee.as_deref(), Some("Lee"));
        assert_eq!(rows[1].tracker_status.as_deref(), Some("In Progress"));
    }

    #[tokio::test]
    async fn test_overview_degrades_without_tracker() {
        let repo = seeded().await;

        for tracker in [FakeTracker::unconfigured(), FakeTracker::failing()] {
            let rows = overview(&repo, &tracker).await.unwrap();
            assert_eq!(rows.len(), 2);
            assert!(rows
                .iter()
                .all(|r| r.status == RequirementProgress::NotStarted && r.assignee.is_none()));
        }
    }

    #[tokio::test]
    async fn test_missing_upstream_issue_is_not_started() {
        let repo = seeded().await;
        let rows = overview(&repo, &FakeTracker::default()).await.unwrap();
        assert!(rows.iter().all(|r| r.status == RequirementProgress::NotStarted));
        assert!(rows.iter().all(|r| r.tracker_status.is_none()));
    }
}
