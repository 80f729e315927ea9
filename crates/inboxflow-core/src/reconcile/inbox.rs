//! Shared result set of a refresh cycle.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::{Email, EmailStatus};

/// Visible messages of one refresh, in provider order.
///
/// Cloning shares the same list; the background verification mutates it in
/// place when it reverts a ticket.
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    emails: Arc<RwLock<Vec<Email>>>,
}

impl Inbox {
    /// Wraps a list of merged messages.
    #[must_use]
    pub fn new(emails: Vec<Email>) -> Self {
        Self {
            emails: Arc::new(RwLock::new(emails)),
        }
    }

    /// Current contents.
    pub async fn snapshot(&self) -> Vec<Email> {
        self.emails.read().await.clone()
    }

    /// Number of messages.
    pub async fn len(&self) -> usize {
        self.emails.read().await.len()
    }

    /// Whether the inbox is empty.
    pub async fn is_empty(&self) -> bool {
        self.emails.read().await.is_empty()
    }

    /// Resets the given messages to `pending` without a ticket. Returns how
    /// many were present.
    pub(crate) async fn revert_tickets(&self, ids: &[String]) -> usize {
        let mut emails = self.emails.write().await;
        let mut reverted = 0;
        for email in emails.iter_mut().filter(|e| ids.contains(&e.id)) {
            email.status = EmailStatus::Pending;
            email.ticket_key = None;
            reverted += 1;
        }
        reverted
    }
}
