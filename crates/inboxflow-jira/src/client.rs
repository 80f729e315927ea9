//! Jira Cloud REST v3 client.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};

use crate::adf::markdown_to_adf;
use crate::error::{Error, Result};
use crate::types::{
    CreateResponse, CreatedIssue, IssueStatus, IssueType, JiraConfig, NewIssue, Priority,
    ProjectResponse, SearchIssue, SearchResponse,
};

/// Keys per JQL `key in (...)` query; each query returns a single page.
const SEARCH_CHUNK: usize = 50;

/// Issue tracker client bound to one project.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    config: JiraConfig,
}

impl JiraClient {
    /// Creates a new client. An incomplete configuration is accepted; every
    /// remote call then fails with [`Error::NotConfigured`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: JiraConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http, config })
    }

    /// Returns true when base URL, email, token and project key are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Key of the project issues are created in.
    #[must_use]
    pub fn project_key(&self) -> &str {
        &self.config.project_key
    }

    /// Browse URL of an issue.
    #[must_use]
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.config.base_url.trim_end_matches('/'))
    }

    fn ensure_configured(&self) -> Result<()> {
        let missing = self.config.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::NotConfigured(format!("missing {}", missing.join(", "))))
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<T> {
        self.ensure_configured()?;

        let url = format!(
            "{}/rest/api/3{path}",
            self.config.base_url.trim_end_matches('/')
        );
        let mut request = self
            .http
            .request(method, url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .header("accept", "application/json")
            .query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(path, status = %status, "Jira response");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }

        Ok(response.json().await?)
    }

    /// Creates an issue in the configured project.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty summary,
    /// [`Error::NotConfigured`] or [`Error::Api`] otherwise.
    pub async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
        let summary = issue.summary.trim();
        if summary.is_empty() {
            return Err(Error::InvalidInput("summary is required".into()));
        }
        self.ensure_configured()?;

        let body = json!({
            "fields": {
                "project": {"key": self.config.project_key},
                "issuetype": {"name": issue.issue_type_or_default()},
                "priority": {"name": issue.priority_or_default()},
                "summary": summary,
                "description": markdown_to_adf(&issue.description),
            }
        });

        let created: CreateResponse = self.call(Method::POST, "/issue", &[], Some(&body)).await?;
        info!(key = %created.key, "created Jira issue");

        Ok(CreatedIssue {
            url: self.browse_url(&created.key),
            key: created.key,
            id: created.id,
        })
    }

    /// Returns the subset of `keys` that still exist upstream.
    ///
    /// Unknown keys do not fail the query.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker is not configured or the search fails.
    pub async fn verify_keys_exist(&self, keys: &[String]) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let found = self.search(keys, "key").await?;
        Ok(found.into_iter().map(|i| i.key).collect())
    }

    /// Looks up workflow status and assignee for each existing key.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker is not configured or the search fails.
    pub async fn issue_statuses(&self, keys: &[String]) -> Result<HashMap<String, IssueStatus>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let found = self.search(keys, "summary,status,assignee").await?;
        Ok(found
            .into_iter()
            .map(|issue| {
                let fields = issue.fields.unwrap_or_default();
                let status = IssueStatus {
                    status: fields
                        .status
                        .map_or_else(|| "Unknown".to_string(), |s| s.name),
                    assignee: fields.assignee.and_then(|a| a.display_name),
                };
                (issue.key, status)
            })
            .collect())
    }

    async fn search(&self, keys: &[String], fields: &str) -> Result<Vec<SearchIssue>> {
        let mut issues = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(SEARCH_CHUNK) {
            let jql = format!("key in ({})", chunk.join(","));
            let page: SearchResponse = self
                .call(
                    Method::GET,
                    "/search",
                    &[
                        ("jql", jql),
                        ("fields", fields.to_string()),
                        ("maxResults", chunk.len().to_string()),
                        ("validateQuery", "warn".to_string()),
                    ],
                    None,
                )
                .await?;
            issues.extend(page.issues);
        }
        Ok(issues)
    }

    /// Non-subtask issue types of the configured project.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker is not configured or the request fails.
    pub async fn list_issue_types(&self) -> Result<Vec<IssueType>> {
        let path = format!("/project/{}", self.config.project_key);
        let project: ProjectResponse = self.call(Method::GET, &path, &[], None).await?;
        Ok(project
            .issue_types
            .into_iter()
            .filter(|t| !t.subtask)
            .collect())
    }

    /// All priorities.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker is not configured or the request fails.
    pub async fn list_priorities(&self) -> Result<Vec<Priority>> {
        self.call(Method::GET, "/priority", &[], None).await
    }
}
