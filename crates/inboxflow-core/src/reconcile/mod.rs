//! Refresh cycle: merge live mailbox state with the cache.
//!
//! One [`Reconciler::refresh`] call
//!
//! 1. loads the cache and splits scores into fresh and expired,
//! 2. fetches messages, advertising fresh ids as known,
//! 3. drops messages from blocked senders,
//! 4. classifies only messages without a fresh score,
//! 5. merges score, visibility and workflow state per message,
//! 6. writes every score back with a new timestamp,
//! 7. spawns a background check that reverts `jira_created` entries whose
//!    ticket no longer exists upstream.
//!
//! A mailbox failure aborts the cycle. Classifier, persistence and
//! verification failures are logged and absorbed.

mod engine;
mod inbox;
mod verify;

pub use engine::{MAX_RESULTS_LIMIT, Reconciler, RefreshOutcome, RefreshRequest};
pub use inbox::Inbox;
pub use verify::VerificationReport;
