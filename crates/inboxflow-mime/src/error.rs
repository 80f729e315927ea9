//! Error types for message normalization.

use std::string::FromUtf8Error;

/// Result type alias for normalization operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Normalization error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Base64 decode error.
    #[error("Base64 decode error: {0}")]
    Base64Decode(#[from] base64::DecodeError),

    /// UTF-8 decode error.
    #[error("UTF-8 decode error: {0}")]
    Utf8Decode(#[from] FromUtf8Error),

    /// HTML could not be converted to text.
    #[error("HTML conversion error: {0}")]
    Html(String),
}
