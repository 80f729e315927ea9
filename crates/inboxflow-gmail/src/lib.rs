//! # inboxflow-gmail
//!
//! Read-only mailbox access over the Gmail REST API.
//!
//! ## Features
//!
//! - **Token refresh**: Exchanges a long-lived `OAuth2` refresh token for
//!   short-lived access tokens and caches them until shortly before expiry
//! - **Label-scoped listing**: Lists the newest messages carrying every given
//!   label id
//! - **Concurrent detail fetch**: Message bodies are fetched in parallel and
//!   returned in provider order
//! - **Normalization**: Sender, subject, body, language, tags and unread flag
//!   are extracted into [`MailMessage`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use inboxflow_gmail::{GmailClient, GmailCredentials};
//!
//! let client = GmailClient::new(GmailCredentials {
//!     client_id: "id".into(),
//!     client_secret: "secret".into(),
//!     refresh_token: "refresh".into(),
//! })?;
//!
//! let labels = vec!["Label_12".to_string()];
//! for message in client.fetch_messages(&labels, 20).await? {
//!     println!("{} {}", message.id, message.subject);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod auth;
mod client;
mod error;
mod types;

pub use auth::{AccessToken, GmailCredentials, TokenSource};
pub use client::GmailClient;
pub use error::{Error, Result};
pub use types::{Label, MailMessage};
