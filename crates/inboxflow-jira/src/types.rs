//! Request and response types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default issue type for new issues.
pub const DEFAULT_ISSUE_TYPE: &str = "Task";

/// Default priority for new issues.
pub const DEFAULT_PRIORITY: &str = "Medium";

/// Connection settings. The project is fixed here, not per call.
#[derive(Clone, Default)]
pub struct JiraConfig {
    /// Site URL, e.g. `https://acme.atlassian.net`.
    pub base_url: String,
    /// Account email for basic auth.
    pub email: String,
    /// API token for basic auth.
    pub api_token: String,
    /// Key of the project issues are created in.
    pub project_key: String,
}

impl JiraConfig {
    /// Names of the settings that are blank.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("base_url", &self.base_url),
            ("email", &self.email),
            ("api_token", &self.api_token),
            ("project_key", &self.project_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Returns true when every setting is present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

impl fmt::Debug for JiraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .field("project_key", &self.project_key)
            .finish()
    }
}

/// Fields for a new issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIssue {
    /// Summary line; required.
    pub summary: String,
    /// Markdown-like description.
    #[serde(default)]
    pub description: String,
    /// Issue type name; defaults to `Task`.
    #[serde(default)]
    pub issue_type: Option<String>,
    /// Priority name; defaults to `Medium`.
    #[serde(default)]
    pub priority: Option<String>,
}

impl NewIssue {
    /// Issue with default type and priority.
    #[must_use]
    pub fn new(summary: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            description: description.into(),
            issue_type: None,
            priority: None,
        }
    }

    pub(crate) fn issue_type_or_default(&self) -> &str {
        self.issue_type
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_ISSUE_TYPE)
    }

    pub(crate) fn priority_or_default(&self) -> &str {
        self.priority
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_PRIORITY)
    }
}

/// A created issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedIssue {
    /// Issue key, e.g. `SUP-42`.
    pub key: String,
    /// Numeric issue id.
    pub id: String,
    /// Browse URL.
    pub url: String,
}

/// An issue type of the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueType {
    /// Type id.
    pub id: String,
    /// Type name.
    pub name: String,
    /// Whether this is a subtask type.
    #[serde(default)]
    pub subtask: bool,
}

/// A priority level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Priority {
    /// Priority id.
    pub id: String,
    /// Priority name.
    pub name: String,
}

/// Workflow state of an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueStatus {
    /// Status name as configured in the workflow, e.g. `In Progress`.
    pub status: String,
    /// Assignee display name.
    pub assignee: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateResponse {
    pub id: String,
    pub key: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectResponse {
    #[serde(default, rename = "issueTypes")]
    pub issue_types: Vec<IssueType>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub issues: Vec<SearchIssue>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchIssue {
    pub key: String,
    #[serde(default)]
    pub fields: Option<SearchFields>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchFields {
    #[serde(default)]
    pub status: Option<NamedField>,
    #[serde(default)]
    pub assignee: Option<AssigneeField>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NamedField {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssigneeField {
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields() {
        let config = JiraConfig {
            base_url: "https://acme.atlassian.net".into(),
            email: "bot@acme.com".into(),
            ..JiraConfig::default()
        };
        assert_eq!(config.missing_fields(), vec!["api_token", "project_key"]);
        assert!(!config.is_configured());
    }

    #[test]
    fn test_new_issue_defaults() {
        let issue = NewIssue::new("Summary", "");
        assert_eq!(issue.issue_type_or_default(), "Task");
        assert_eq!(issue.priority_or_default(), "Medium");

        let issue = NewIssue {
            issue_type: Some("Bug".into()),
            priority: Some(" ".into()),
            ..NewIssue::new("Summary", "")
        };
        assert_eq!(issue.issue_type_or_default(), "Bug");
        assert_eq!(issue.priority_or_default(), "Medium");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = JiraConfig {
            api_token: "very-secret".into(),
            ..JiraConfig::default()
        };
        assert!(!format!("{config:?}").contains("very-secret"));
    }
}
