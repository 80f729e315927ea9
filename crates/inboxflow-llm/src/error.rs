//! Error types for language model calls.

/// Result type alias for language model operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Language model error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the model provider.
    #[error("model API {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Upstream error message.
        message: String,
    },

    /// No API key configured.
    #[error("not configured: {0}")]
    NotConfigured(String),

    /// The provider answered with an unexpected body.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Caller supplied unusable input.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
