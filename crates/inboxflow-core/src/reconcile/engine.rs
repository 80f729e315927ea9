//! Reconciliation engine.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use inboxflow_gmail::MailMessage;
use inboxflow_llm::Verdict;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::inbox::Inbox;
use super::verify::{VerificationReport, verify_tickets};
use crate::cache::CacheStore;
use crate::model::{CacheSnapshot, DEFAULT_SCORE, Email, EmailStatus, ScoreEntry};
use crate::service::{Classifier, FetchRequest, Mailbox, Tracker};
use crate::Result;

/// Upper bound on messages per refresh.
pub const MAX_RESULTS_LIMIT: u32 = 50;

/// Inputs of one refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct RefreshRequest {
    /// Label ids every message must carry.
    pub label_ids: Vec<String>,
    /// Requested message count, clamped to `1..=50`.
    pub max_results: u32,
    /// Ids the caller already holds; forwarded to the mailbox as a hint.
    pub known_ids: HashSet<String>,
}

/// Result of one refresh cycle.
#[derive(Debug)]
pub struct RefreshOutcome {
    /// Visible merged messages, in provider order.
    pub inbox: Inbox,
    /// When the cycle started.
    pub fetched_at: DateTime<Utc>,
    /// Background ticket verification, if one was started.
    pub verification: Option<JoinHandle<VerificationReport>>,
}

/// Runs refresh cycles against injected collaborators.
#[derive(Clone)]
pub struct Reconciler {
    store: Arc<CacheStore>,
    mailbox: Arc<dyn Mailbox>,
    classifier: Arc<dyn Classifier>,
    tracker: Arc<dyn Tracker>,
    blocked_senders: HashSet<String>,
}

impl Reconciler {
    /// Creates an engine.
    #[must_use]
    pub fn new(
        store: Arc<CacheStore>,
        mailbox: Arc<dyn Mailbox>,
        classifier: Arc<dyn Classifier>,
        tracker: Arc<dyn Tracker>,
    ) -> Self {
        Self {
            store,
            mailbox,
            classifier,
            tracker,
            blocked_senders: HashSet::new(),
        }
    }

    /// Drops messages from these addresses (case-insensitive) before they
    /// are classified or shown.
    #[must_use]
    pub fn with_blocked_senders<I, S>(mut self, senders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.blocked_senders = senders
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    /// The mailbox collaborator.
    #[must_use]
    pub fn mailbox(&self) -> &Arc<dyn Mailbox> {
        &self.mailbox
    }

    fn is_blocked(&self, address: &str) -> bool {
        !self.blocked_senders.is_empty()
            && self.blocked_senders.contains(&address.trim().to_lowercase())
    }

    /// Runs one refresh cycle.
    ///
    /// # Errors
    ///
    /// Returns the mailbox error if fetching fails. Nothing is merged or
    /// persisted in that case.
    pub async fn refresh(&self, request: RefreshRequest) -> Result<RefreshOutcome> {
        let now = Utc::now();
        let max_results = request.max_results.clamp(1, MAX_RESULTS_LIMIT);

        let cache = self.store.load_all().await;
        let fresh: HashSet<&str> = cache
            .scores
            .iter()
            .filter(|(_, entry)| entry.is_fresh(now))
            .map(|(id, _)| id.as_str())
            .collect();

        let mut known_ids = request.known_ids;
        known_ids.extend(fresh.iter().map(|id| (*id).to_string()));

        let fetch = FetchRequest {
            label_ids: request.label_ids,
            max_results,
            known_ids,
        };
        let fetched = self
            .mailbox
            .fetch_messages(&fetch)
            .await
            .inspect_err(|e| error!(error = %e, "mailbox fetch failed, aborting refresh"))?;

        let fetched_count = fetched.len();
        let messages: Vec<MailMessage> = fetched
            .into_iter()
            .filter(|m| !self.is_blocked(&m.from_email))
            .collect();
        if messages.len() < fetched_count {
            debug!(
                dropped = fetched_count - messages.len(),
                "dropped messages from blocked senders"
            );
        }

        let unknown: Vec<&MailMessage> = messages
            .iter()
            .filter(|m| !fresh.contains(m.id.as_str()))
            .collect();
        let verdicts = if unknown.is_empty() {
            debug!(count = messages.len(), "all messages cached, skipping classifier");
            HashMap::new()
        } else {
            info!(
                unknown = unknown.len(),
                cached = messages.len() - unknown.len(),
                "classifying uncached messages"
            );
            self.classifier.classify(&unknown).await
        };

        let (emails, scores) = merge(messages, &cache, &verdicts, now);

        if let Err(e) = self.store.upsert_scores(&scores).await {
            warn!(error = %e, count = scores.len(), "failed to persist scores");
        }

        let shown = emails.len();
        let inbox = Inbox::new(emails);
        let verification = self.spawn_verification(&cache, &inbox);

        info!(
            fetched = fetched_count,
            shown,
            verifying = verification.is_some(),
            "refresh complete"
        );

        Ok(RefreshOutcome {
            inbox,
            fetched_at: now,
            verification,
        })
    }

    fn spawn_verification(
        &self,
        cache: &CacheSnapshot,
        inbox: &Inbox,
    ) -> Option<JoinHandle<VerificationReport>> {
        let linked: Vec<(String, String)> = cache
            .statuses
            .iter()
            .filter(|(_, entry)| entry.status == EmailStatus::JiraCreated)
            .filter_map(|(id, entry)| {
                entry
                    .ticket_key
                    .as_ref()
                    .filter(|key| !key.is_empty())
                    .map(|key| (id.clone(), key.clone()))
            })
            .collect();

        if linked.is_empty() {
            return None;
        }
        if !self.tracker.is_configured() {
            debug!(linked = linked.len(), "tracker not configured, skipping verification");
            return None;
        }

        Some(tokio::spawn(verify_tickets(
            Arc::clone(&self.store),
            Arc::clone(&self.tracker),
            linked,
            inbox.clone(),
        )))
    }
}

/// Merges fetched messages with cached state and fresh verdicts.
///
/// Returns the visible messages in input order and a score entry for every
/// message, hidden ones included.
fn merge(
    messages: Vec<MailMessage>,
    cache: &CacheSnapshot,
    verdicts: &HashMap<String, Verdict>,
    now: DateTime<Utc>,
) -> (Vec<Email>, HashMap<String, ScoreEntry>) {
    let mut emails = Vec::with_capacity(messages.len());
    let mut scores = HashMap::with_capacity(messages.len());

    for message in messages {
        let (score, visible) = resolve_score(
            cache.scores.get(&message.id),
            verdicts.get(&message.id),
            message.default_score,
            now,
        );

        scores.insert(
            message.id.clone(),
            ScoreEntry {
                score,
                visible,
                scored_at: now,
            },
        );

        if visible {
            let state = cache.statuses.get(&message.id);
            emails.push(Email::merge(message, score, state));
        } else {
            debug!(email_id = %message.id, score, "message hidden");
        }
    }

    (emails, scores)
}

/// Score and visibility for one message.
///
/// A fresh cache entry wins outright. Otherwise the new verdict decides the
/// score, falling back to the mailbox's own score and then 50. An expired
/// entry that was visible stays visible.
fn resolve_score(
    cached: Option<&ScoreEntry>,
    verdict: Option<&Verdict>,
    provided: Option<u8>,
    now: DateTime<Utc>,
) -> (u8, bool) {
    if let Some(entry) = cached.filter(|e| e.is_fresh(now)) {
        return (entry.score, entry.visible);
    }

    let score = verdict.map_or_else(|| provided.unwrap_or(DEFAULT_SCORE), |v| v.score);
    let new_visible = verdict.is_none_or(|v| v.visible);
    let visible = cached.map_or(new_visible, |e| e.visible || new_visible);
    (score, visible)
}
