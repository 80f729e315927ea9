//! Background check of ticket-linked cache entries.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::inbox::Inbox;
use crate::cache::CacheStore;
use crate::model::EmailStatus;
use crate::service::Tracker;

/// Outcome of one verification pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    /// Number of ticket-linked entries looked at.
    pub checked: usize,
    /// Message ids reverted to `pending`, sorted.
    pub reverted: Vec<String>,
}

/// Reverts every `(message id, ticket key)` pair whose key is gone upstream.
///
/// Tracker and store failures are logged; the pass then ends early.
pub(crate) async fn verify_tickets(
    store: Arc<CacheStore>,
    tracker: Arc<dyn Tracker>,
    linked: Vec<(String, String)>,
    inbox: Inbox,
) -> VerificationReport {
    let mut report = VerificationReport {
        checked: linked.len(),
        reverted: Vec::new(),
    };

    let mut keys: Vec<String> = linked.iter().map(|(_, key)| key.to_uppercase()).collect();
    keys.sort();
    keys.dedup();

    let existing: HashSet<String> = match tracker.verify_keys_exist(&keys).await {
        Ok(found) => found.iter().map(|key| key.to_uppercase()).collect(),
        Err(e) => {
            warn!(error = %e, keys = keys.len(), "ticket verification failed");
            return report;
        }
    };

    let mut stale: Vec<String> = linked
        .into_iter()
        .filter(|(_, key)| !existing.contains(&key.to_uppercase()))
        .map(|(id, _)| id)
        .collect();
    stale.sort();

    if stale.is_empty() {
        debug!(checked = report.checked, "all linked tickets still exist");
        return report;
    }

    info!(count = stale.len(), ids = ?stale, "reverting messages whose ticket was deleted");
    if let Err(e) = store
        .batch_set_status(&stale, EmailStatus::Pending, true)
        .await
    {
        warn!(error = %e, "failed to persist ticket reversion");
    }

    let in_result = inbox.revert_tickets(&stale).await;
    debug!(in_result, "reverted messages in current result");

    report.reverted = stale;
    report
}
