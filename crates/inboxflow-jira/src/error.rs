//! Error types for the tracker client.

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Tracker error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL, account email, API token or project key missing.
    #[error("Jira is not configured: {0}")]
    NotConfigured(String),

    /// Non-success response from Jira.
    #[error("Jira API {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated to 500 characters.
        message: String,
    },

    /// Caller supplied unusable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
