//! # inboxflow-core
//!
//! Email-to-ticket lifecycle logic for `inboxflow`.
//!
//! This crate provides:
//! - Collaborator interfaces for the mailbox, the classifier and the tracker
//! - A durable cache of AI scores and per-message workflow state (`SQLite`)
//! - The refresh cycle that reconciles live mail with the cache
//! - Background verification of linked tracker tickets
//! - User-driven workflow transitions
//! - Standalone requirement tickets and their upstream progress

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
mod error;
pub mod model;
pub mod reconcile;
pub mod requirement;
pub mod service;
pub mod workflow;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod testing;

pub use cache::CacheStore;
pub use error::{Error, Result};
pub use model::{
    CacheSnapshot, DEFAULT_SCORE, Email, EmailStatus, SCORE_TTL_DAYS, ScoreEntry, StatusEntry,
};
pub use reconcile::{
    Inbox, MAX_RESULTS_LIMIT, Reconciler, RefreshOutcome, RefreshRequest, VerificationReport,
};
pub use requirement::{
    NewRequirement, RequirementProgress, RequirementRepository, RequirementState,
    RequirementTicket, TrackedRequirement,
};
pub use service::{Classifier, DemoMailbox, FetchRequest, Mailbox, Tracker};
pub use workflow::{Action, Workflow};

pub use inboxflow_gmail::{GmailClient, GmailCredentials, Label, MailMessage};
pub use inboxflow_jira::{CreatedIssue, IssueType, JiraClient, JiraConfig, NewIssue, Priority};
pub use inboxflow_llm::{
    ClassifierClient, ClassifierConfig, DraftingClient, DraftingConfig, ReplyDraft, ReplyRequest,
    TicketDraft, TicketRequest, Tone,
};
pub use inboxflow_mime::{Language, detect_language};
