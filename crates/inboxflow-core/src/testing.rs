//! In-crate fake collaborators that record their calls.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use inboxflow_gmail::{Label, MailMessage};
use inboxflow_jira::{CreatedIssue, IssueStatus, IssueType, NewIssue, Priority};
use inboxflow_llm::Verdict;
use inboxflow_mime::Language;

use crate::service::{Classifier, FetchRequest, Mailbox, Tracker};
use crate::{Error, Result};

pub fn message(id: &str, from_email: &str, unread: bool) -> MailMessage {
    MailMessage {
        id: id.to_string(),
        from_name: id.to_uppercase(),
        from_email: from_email.to_string(),
        subject: format!("Subject {id}"),
        body: format!("Body of {id}"),
        language: Language::English,
        tags: vec!["INBOX".to_string()],
        received_at: Utc::now(),
        unread,
        default_score: None,
    }
}

#[derive(Default)]
pub struct FakeMailbox {
    pub messages: Vec<MailMessage>,
    pub fail: bool,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<FetchRequest>>,
}

impl FakeMailbox {
    pub fn with(messages: Vec<MailMessage>) -> Self {
        Self {
            messages,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Mailbox for FakeMailbox {
    async fn fetch_messages(&self, request: &FetchRequest) -> Result<Vec<MailMessage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if self.fail {
            return Err(Error::Transport("connection reset".into()));
        }
        Ok(self.messages.clone())
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct FakeClassifier {
    pub verdicts: HashMap<String, Verdict>,
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<String>>,
}

impl FakeClassifier {
    pub fn with(verdicts: &[(&str, u8, bool)]) -> Self {
        Self {
            verdicts: verdicts
                .iter()
                .map(|&(id, score, visible)| (id.to_string(), Verdict { score, visible }))
                .collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Classifier for FakeClassifier {
    async fn classify(&self, messages: &[&MailMessage]) -> HashMap<String, Verdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .unwrap()
            .extend(messages.iter().map(|m| m.id.clone()));
        messages
            .iter()
            .filter_map(|m| self.verdicts.get(&m.id).map(|v| (m.id.clone(), *v)))
            .collect()
    }
}

pub struct FakeTracker {
    pub configured: bool,
    /// Keys that exist upstream; `None` makes lookups fail.
    pub existing: Option<Vec<String>>,
    pub statuses: HashMap<String, IssueStatus>,
    pub verify_calls: AtomicUsize,
    pub created: Mutex<Vec<NewIssue>>,
}

impl Default for FakeTracker {
    fn default() -> Self {
        Self {
            configured: true,
            existing: Some(Vec::new()),
            statuses: HashMap::new(),
            verify_calls: AtomicUsize::new(0),
            created: Mutex::new(Vec::new()),
        }
    }
}

impl FakeTracker {
    pub fn with_existing(keys: &[&str]) -> Self {
        Self {
            existing: Some(keys.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            existing: None,
            ..Self::default()
        }
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if !self.configured {
            return Err(Error::Config("tracker not configured".into()));
        }
        if self.existing.is_none() {
            return Err(Error::Tracker {
                status: 503,
                message: "unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Tracker for FakeTracker {
    fn is_configured(&self) -> bool {
        self.configured
    }

    fn project_key(&self) -> &str {
        "SUP"
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<CreatedIssue> {
        self.check()?;
        let mut created = self.created.lock().unwrap();
        created.push(issue.clone());
        let key = format!("SUP-{}", 100 + created.len());
        Ok(CreatedIssue {
            url: format!("https://tracker.example/browse/{key}"),
            id: (10_000 + created.len()).to_string(),
            key,
        })
    }

    async fn verify_keys_exist(&self, keys: &[String]) -> Result<Vec<String>> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let existing = self.existing.clone().unwrap_or_default();
        Ok(keys.iter().filter(|k| existing.contains(k)).cloned().collect())
    }

    async fn list_issue_types(&self) -> Result<Vec<IssueType>> {
        self.check()?;
        Ok(vec![IssueType {
            id: "1".into(),
            name: "Task".into(),
            subtask: false,
        }])
    }

    async fn list_priorities(&self) -> Result<Vec<Priority>> {
        self.check()?;
        Ok(vec![Priority {
            id: "3".into(),
            name: "Medium".into(),
        }])
    }

    async fn issue_statuses(&self, keys: &[String]) -> Result<HashMap<String, IssueStatus>> {
        self.check()?;
        Ok(keys
            .iter()
            .filter_map(|k| self.statuses.get(k).map(|s| (k.clone(), s.clone())))
            .collect())
    }
}
