//! Collaborator interfaces.
//!
//! The reconciliation engine and the workflow actions talk to the mailbox,
//! the classifier and the issue tracker only through these traits. The
//! concrete Gmail, LLM and Jira clients implement them here.

mod classifier;
mod demo;
mod mailbox;
mod tracker;

pub use classifier::Classifier;
pub use demo::DemoMailbox;
pub use mailbox::{FetchRequest, Mailbox};
pub use tracker::Tracker;
