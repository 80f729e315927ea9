//! Gmail REST client.

use std::time::Duration;

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::auth::{GmailCredentials, TokenSource};
use crate::error::{Error, Result};
use crate::types::{LabelList, Label, MailMessage, MessageList, RawMessage};

/// Base URL of the Gmail v1 API.
const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

/// Request timeout for every API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only Gmail client scoped to the authenticated user (`me`).
#[derive(Debug)]
pub struct GmailClient {
    http: reqwest::Client,
    tokens: TokenSource,
    base_url: String,
}

impl GmailClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are incomplete or the HTTP client
    /// cannot be built.
    pub fn new(credentials: GmailCredentials) -> Result<Self> {
        credentials.validate()?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            tokens: TokenSource::new(credentials, http.clone()),
            http,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Overrides the `OAuth2` token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.tokens = self.tokens.with_token_url(url);
        self
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}/users/me/{path}", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(format!("{path}: {e}")))
    }

    /// Lists all labels of the mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_labels(&self) -> Result<Vec<Label>> {
        let list: LabelList = self.get("labels", &[]).await?;
        Ok(list.labels)
    }

    /// Fetches up to `max_results` messages carrying all of `label_ids`.
    ///
    /// Message details are requested concurrently; the result keeps the
    /// provider's listing order (newest first).
    ///
    /// # Errors
    ///
    /// Returns an error if listing or any detail fetch fails.
    pub async fn fetch_messages(
        &self,
        label_ids: &[String],
        max_results: u32,
    ) -> Result<Vec<MailMessage>> {
        let mut query: Vec<(&str, String)> = label_ids
            .iter()
            .map(|id| ("labelIds", id.clone()))
            .collect();
        query.push(("maxResults", max_results.to_string()));

        let list: MessageList = self.get("messages", &query).await?;
        if list.messages.is_empty() {
            debug!(labels = ?label_ids, "no messages for label filter");
            return Ok(Vec::new());
        }

        let details = try_join_all(list.messages.iter().map(|m| self.fetch_message(&m.id))).await?;

        info!(count = details.len(), "fetched messages from Gmail");
        Ok(details.into_iter().map(RawMessage::normalize).collect())
    }

    async fn fetch_message(&self, id: &str) -> Result<RawMessage> {
        self.get(&format!("messages/{id}"), &[("format", "full".to_string())])
            .await
    }
}
