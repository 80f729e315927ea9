//! User-driven status transitions.
//!
//! ```text
//! pending --start_reply--> pending (seen) --save_reply--> replied
//! pending --open_ticket_dialog--> pending (seen) --record_ticket(K)--> jira_created(K)
//! any --mark_processed--> completed
//! ```
//!
//! `completed` is terminal: actions that would change the status of a
//! completed message are rejected; opening a dialog only clears the new flag.

use std::sync::Arc;

use inboxflow_jira::{CreatedIssue, NewIssue};
use serde::Deserialize;
use tracing::info;

use crate::cache::CacheStore;
use crate::model::{EmailStatus, StatusEntry};
use crate::service::Tracker;
use crate::{Error, Result};

/// A workflow action on one message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    /// Reply editor opened.
    StartReply,
    /// Ticket dialog opened.
    OpenTicketDialog,
    /// Reply saved.
    SaveReply,
    /// Ticket created elsewhere and linked here.
    RecordTicket {
        /// Tracker key.
        #[serde(rename = "ticketKey")]
        ticket_key: String,
    },
    /// Message done.
    MarkProcessed,
}

/// Applies workflow actions through the cache store.
#[derive(Clone)]
pub struct Workflow {
    store: Arc<CacheStore>,
    tracker: Arc<dyn Tracker>,
}

impl Workflow {
    /// Creates the action handler.
    #[must_use]
    pub fn new(store: Arc<CacheStore>, tracker: Arc<dyn Tracker>) -> Self {
        Self { store, tracker }
    }

    /// Applies `action` to message `email_id` and returns the new state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for an empty id, an empty ticket key, or
    /// a status change on a completed message; [`Error::Database`] on store
    /// failures.
    pub async fn apply(&self, email_id: &str, action: &Action) -> Result<StatusEntry> {
        let email_id = email_id.trim();
        if email_id.is_empty() {
            return Err(Error::Validation("message id is required".into()));
        }

        let current = self
            .store
            .get_status(email_id)
            .await?
            .map_or(EmailStatus::Pending, |entry| entry.status);

        let (status, ticket_key) = match action {
            Action::StartReply | Action::OpenTicketDialog => (current, None),
            Action::SaveReply => (transition(current, EmailStatus::Replied)?, None),
            Action::RecordTicket { ticket_key } => {
                let key = ticket_key.trim().to_uppercase();
                if key.is_empty() {
                    return Err(Error::Validation("ticket key is required".into()));
                }
                (transition(current, EmailStatus::JiraCreated)?, Some(key))
            }
            Action::MarkProcessed => (EmailStatus::Completed, None),
        };

        self.store
            .upsert_status(email_id, status, false, ticket_key.as_deref())
            .await?;
        info!(email_id, action = ?action, status = %status, "applied workflow action");

        self.store
            .get_status(email_id)
            .await?
            .ok_or_else(|| Error::Validation(format!("no state stored for {email_id}")))
    }

    /// Marks the reply editor as opened.
    ///
    /// # Errors
    ///
    /// See [`Workflow::apply`].
    pub async fn start_reply(&self, email_id: &str) -> Result<StatusEntry> {
        self.apply(email_id, &Action::StartReply).await
    }

    /// Marks the ticket dialog as opened.
    ///
    /// # Errors
    ///
    /// See [`Workflow::apply`].
    pub async fn open_ticket_dialog(&self, email_id: &str) -> Result<StatusEntry> {
        self.apply(email_id, &Action::OpenTicketDialog).await
    }

    /// Records a saved reply.
    ///
    /// # Errors
    ///
    /// See [`Workflow::apply`].
    pub async fn save_reply(&self, email_id: &str) -> Result<StatusEntry> {
        self.apply(email_id, &Action::SaveReply).await
    }

    /// Links a tracker issue.
    ///
    /// # Errors
    ///
    /// See [`Workflow::apply`].
    pub async fn record_ticket(&self, email_id: &str, ticket_key: &str) -> Result<StatusEntry> {
        self.apply(
            email_id,
            &Action::RecordTicket {
                ticket_key: ticket_key.to_string(),
            },
        )
        .await
    }

    /// Marks a message as done.
    ///
    /// # Errors
    ///
    /// See [`Workflow::apply`].
    pub async fn mark_processed(&self, email_id: &str) -> Result<StatusEntry> {
        self.apply(email_id, &Action::MarkProcessed).await
    }

    /// Creates a tracker issue for a message and links it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the message is completed or the input
    /// is invalid, and tracker errors unchanged. Nothing is created upstream
    /// for a completed message.
    pub async fn create_ticket_for(&self, email_id: &str, issue: &NewIssue) -> Result<CreatedIssue> {
        if email_id.trim().is_empty() {
            return Err(Error::Validation("message id is required".into()));
        }
        if let Some(entry) = self.store.get_status(email_id.trim()).await?
            && entry.status.is_terminal()
        {
            return Err(Error::Validation(format!("{email_id} is already completed")));
        }

        let created = self.tracker.create_issue(issue).await?;
        self.record_ticket(email_id, &created.key).await?;
        info!(email_id, key = %created.key, "ticket created for message");
        Ok(created)
    }
}

fn transition(from: EmailStatus, to: EmailStatus) -> Result<EmailStatus> {
    if from.is_terminal() {
        return Err(Error::Validation(format!(
            "cannot move a {from} message to {to}"
        )));
    }
    Ok(to)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::FakeTracker;

    async fn workflow(tracker: FakeTracker) -> (Workflow, Arc<CacheStore>, Arc<FakeTracker>) {
        let store = Arc::new(CacheStore::in_memory().await.unwrap());
        let tracker = Arc::new(tracker);
        let workflow = Workflow::new(Arc::clone(&store), tracker.clone());
        (workflow, store, tracker)
    }

    #[tokio::test]
    async fn test_reply_flow() {
        let (workflow, store, _) = workflow(FakeTracker::default()).await;

        let entry = workflow.start_reply("m1").await.unwrap();
        assert_eq!(entry.status, EmailStatus::Pending);
        assert!(!entry.is_new);

        let entry = workflow.save_reply("m1").await.unwrap();
        assert_eq!(entry.status, EmailStatus::Replied);

        let stored = store.get_status("m1").await.unwrap().unwrap();
        assert_eq!(stored.status, EmailStatus::Replied);
    }

    #[tokio::test]
    async fn test_opening_dialog_keeps_status() {
        let (workflow, store, _) = workflow(FakeTracker::default()).await;
        store
            .upsert_status("m1", EmailStatus::Replied, true, None)
            .await
            .unwrap();

        let entry = workflow.open_ticket_dialog("m1").await.unwrap();
        assert_eq!(entry.status, EmailStatus::Replied);
        assert!(!entry.is_new);
    }

    #[tokio::test]
    async fn test_record_ticket() {
        let (workflow, _, _) = workflow(FakeTracker::default()).await;

        let entry = workflow.record_ticket("m1", " SUP-9 ").await.unwrap();
        assert_eq!(entry.status, EmailStatus::JiraCreated);
        assert_eq!(entry.ticket_key.as_deref(), Some("SUP-9"));

        let err = workflow.record_ticket("m1", "").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_record_ticket_uppercases_key() {
        let (workflow, store, _) = workflow(FakeTracker::default()).await;

        let entry = workflow.record_ticket("m1", "sup-12").await.unwrap();
        assert_eq!(entry.ticket_key.as_deref(), Some("SUP-12"));

        let stored = store.get_status("m1").await.unwrap().unwrap();
        assert_eq!(stored.ticket_key.as_deref(), Some("SUP-12"));
    }

    #[tokio::test]
    async fn test_completed_is_terminal() {
        let (workflow, _, _) = workflow(FakeTracker::default()).await;
        workflow.record_ticket("m1", "SUP-1").await.unwrap();
        let entry = workflow.mark_processed("m1").await.unwrap();
        assert_eq!(entry.status, EmailStatus::Completed);
        assert_eq!(entry.ticket_key.as_deref(), Some("SUP-1"));

        assert!(matches!(
            workflow.save_reply("m1").await,
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            workflow.record_ticket("m1", "SUP-2").await,
            Err(Error::Validation(_))
        ));

        let entry = workflow.start_reply("m1").await.unwrap();
        assert_eq!(entry.status, EmailStatus::Completed);
        assert!(workflow.mark_processed("m1").await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_id_rejected() {
        let (workflow, _, _) = workflow(FakeTracker::default()).await;
        assert!(matches!(
            workflow.start_reply("  ").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_create_ticket_for() {
        let (workflow, store, tracker) = workflow(FakeTracker::default()).await;

        let created = workflow
            .create_ticket_for("m1", &NewIssue::new("Checkout fails", "- pay"))
            .await
            .unwrap();

        assert_eq!(created.key, "SUP-101");
        assert_eq!(tracker.created.lock().unwrap().len(), 1);
        let stored = store.get_status("m1").await.unwrap().unwrap();
        assert_eq!(stored.status, EmailStatus::JiraCreated);
        assert_eq!(stored.ticket_key.as_deref(), Some("SUP-101"));
    }

    #[tokio::test]
    async fn test_create_ticket_for_completed_makes_no_issue() {
        let (workflow, _, tracker) = workflow(FakeTracker::default()).await;
        workflow.mark_processed("m1").await.unwrap();

        let result = workflow
            .create_ticket_for("m1", &NewIssue::new("Summary", ""))
            .await;

        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(tracker.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tracker_failure_leaves_status() {
        let (workflow, store, _) = workflow(FakeTracker::unconfigured()).await;

        let result = workflow
            .create_ticket_for("m1", &NewIssue::new("Summary", ""))
            .await;

        assert!(matches!(result, Err(Error::Config(_))));
        assert!(store.get_status("m1").await.unwrap().is_none());
    }

    #[test]
    fn test_action_from_json() {
        let action: Action = serde_json::from_str(r#"{"action":"save_reply"}"#).unwrap();
        assert_eq!(action, Action::SaveReply);

        let action: Action =
            serde_json::from_str(r#"{"action":"record_ticket","ticketKey":"SUP-3"}"#).unwrap();
        assert_eq!(
            action,
            Action::RecordTicket {
                ticket_key: "SUP-3".into()
            }
        );
    }
}
