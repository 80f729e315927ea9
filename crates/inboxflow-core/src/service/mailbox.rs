//! Mailbox collaborator.

use std::collections::HashSet;

use async_trait::async_trait;
use inboxflow_gmail::{GmailClient, Label, MailMessage};

use crate::Result;

/// Parameters of one mailbox fetch.
#[derive(Debug, Clone, Default)]
pub struct FetchRequest {
    /// Label ids every returned message must carry.
    pub label_ids: Vec<String>,
    /// Upper bound on returned messages.
    pub max_results: u32,
    /// Ids the caller already knows about. A hint only; implementations may
    /// ignore it.
    pub known_ids: HashSet<String>,
}

/// Source of inbound messages.
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// Fetches the newest messages matching the request, newest first.
    async fn fetch_messages(&self, request: &FetchRequest) -> Result<Vec<MailMessage>>;

    /// Lists available labels.
    async fn list_labels(&self) -> Result<Vec<Label>>;
}

#[async_trait]
impl Mailbox for GmailClient {
    async fn fetch_messages(&self, request: &FetchRequest) -> Result<Vec<MailMessage>> {
        Ok(GmailClient::fetch_messages(self, &request.label_ids, request.max_results).await?)
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        Ok(GmailClient::list_labels(self).await?)
    }
}
