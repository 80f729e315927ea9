//! # inboxflow-jira
//!
//! Jira Cloud REST v3 client scoped to a single configured project.
//!
//! ## Features
//!
//! - **Issue creation** with markdown-like descriptions converted to the
//!   Atlassian Document Format (see [`adf`])
//! - **Existence checks** for batches of issue keys, tolerant of keys that
//!   were deleted upstream
//! - **Metadata**: issue types of the project and global priorities
//! - **Status lookup**: workflow status and assignee per issue key
//!
//! ## Quick Start
//!
//! ```ignore
//! use inboxflow_jira::{JiraClient, JiraConfig, NewIssue};
//!
//! let jira = JiraClient::new(JiraConfig {
//!     base_url: "https://acme.atlassian.net".into(),
//!     email: "bot@acme.com".into(),
//!     api_token: "token".into(),
//!     project_key: "SUP".into(),
//! })?;
//!
//! let issue = jira.create_issue(&NewIssue::new("Checkout fails", "## Steps\n- pay")).await?;
//! println!("created {} at {}", issue.key, issue.url);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod adf;
mod client;
mod error;
mod types;

pub use client::JiraClient;
pub use error::{Error, Result};
pub use types::{CreatedIssue, IssueStatus, IssueType, JiraConfig, NewIssue, Priority};
