//! Issue tracker collaborator.

use std::collections::HashMap;

use async_trait::async_trait;
use inboxflow_jira::{CreatedIssue, IssueStatus, IssueType, JiraClient, NewIssue, Priority};

use crate::Result;

/// External issue tracker bound to one project.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Whether credentials and project are set.
    fn is_configured(&self) -> bool;

    /// Key of the target project.
    fn project_key(&self) -> &str;

    /// Creates an issue.
    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue>;

    /// Returns the subset of `keys` that still exist. Empty in, empty out.
    async fn verify_keys_exist(&self, keys: &[String]) -> Result<Vec<String>>;

    /// Non-subtask issue types of the project.
    async fn list_issue_types(&self) -> Result<Vec<IssueType>>;

    /// Priorities.
    async fn list_priorities(&self) -> Result<Vec<Priority>>;

    /// Workflow status and assignee per existing key.
    async fn issue_statuses(&self, keys: &[String]) -> Result<HashMap<String, IssueStatus>>;
}

#[async_trait]
impl Tracker for JiraClient {
    fn is_configured(&self) -> bool {
        JiraClient::is_configured(self)
    }

    fn project_key(&self) -> &str {
        JiraClient::project_key(self)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
        Ok(JiraClient::create_issue(self, issue).await?)
    }

    async fn verify_keys_exist(&self, keys: &[String]) -> Result<Vec<String>> {
        Ok(JiraClient::verify_keys_exist(self, keys).await?)
    }

    async fn list_issue_types(&self) -> Result<Vec<IssueType>> {
        Ok(JiraClient::list_issue_types(self).await?)
    }

    async fn list_priorities(&self) -> Result<Vec<Priority>> {
        Ok(JiraClient::list_priorities(self).await?)
    }

    async fn issue_statuses(&self, keys: &[String]) -> Result<HashMap<String, IssueStatus>> {
        Ok(JiraClient::issue_statuses(self, keys).await?)
    }
}
