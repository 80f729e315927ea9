//! Error types for mailbox access.

/// Result type alias for mailbox operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Mailbox error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport failure (connect, TLS, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the mailbox API.
    #[error("Gmail API {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body (truncated).
        message: String,
    },

    /// `OAuth2` error returned by the token endpoint.
    #[error("OAuth2 error: {error} - {description}")]
    OAuth {
        /// Error code (e.g., `invalid_grant`).
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// Response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client configuration is incomplete.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns true for failures caused by credentials rather than the network.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::OAuth { .. } | Self::Api { status: 401 | 403, .. })
    }
}
