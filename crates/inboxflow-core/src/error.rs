//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A collaborator is not configured (missing credentials or settings).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network or upstream API failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An upstream response could not be understood.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Caller input was rejected.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The issue tracker rejected a request.
    #[error("Tracker error {status}: {message}")]
    Tracker {
        /// Upstream HTTP status.
        status: u16,
        /// Upstream message (truncated).
        message: String,
    },

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl From<inboxflow_gmail::Error> for Error {
    fn from(err: inboxflow_gmail::Error) -> Self {
        match err {
            inboxflow_gmail::Error::InvalidConfig(msg) => Self::Config(msg),
            inboxflow_gmail::Error::InvalidResponse(msg) => Self::Parse(msg),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<inboxflow_llm::Error> for Error {
    fn from(err: inboxflow_llm::Error) -> Self {
        match err {
            inboxflow_llm::Error::NotConfigured(msg) => Self::Config(msg),
            inboxflow_llm::Error::InvalidInput(msg) => Self::Validation(msg),
            inboxflow_llm::Error::InvalidResponse(msg) => Self::Parse(msg),
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<inboxflow_jira::Error> for Error {
    fn from(err: inboxflow_jira::Error) -> Self {
        match err {
            inboxflow_jira::Error::NotConfigured(msg) => Self::Config(msg),
            inboxflow_jira::Error::InvalidInput(msg) => Self::Validation(msg),
            inboxflow_jira::Error::Api { status, message } => Self::Tracker { status, message },
            inboxflow_jira::Error::Http(e) => Self::Transport(e.to_string()),
        }
    }
}
