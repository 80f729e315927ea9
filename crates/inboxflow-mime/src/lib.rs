//! # inboxflow-mime
//!
//! Normalization helpers for inbound support mail.
//!
//! ## Features
//!
//! - **Body extraction**: Walk a nested multipart tree and pick the best body,
//!   preferring `text/plain` over `text/html`
//! - **HTML flattening**: Strip markup from HTML-only messages
//! - **Encoding**: URL-safe Base64 as used by mailbox REST APIs
//! - **Headers**: Case-insensitive header lookup and `From` parsing
//! - **Language detection**: Script/character-range heuristic over a small
//!   fixed set of languages
//!
//! ## Quick Start
//!
//! ```ignore
//! use inboxflow_mime::{Part, extract_body, detect_language, parse_sender};
//!
//! let part = Part::multipart("multipart/alternative", vec![
//!     Part::leaf("text/html", "PGI-SGk8L2I-"),
//!     Part::leaf("text/plain", "SGk"),
//! ]);
//!
//! let body = extract_body(&part)?;
//! assert_eq!(body, "Hi");
//!
//! let sender = parse_sender("\"Jane Doe\" <jane@example.com>");
//! assert_eq!(sender.name, "Jane Doe");
//!
//! println!("{}", detect_language(&body));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
mod header;
mod html;
mod language;
mod part;

pub mod encoding;

pub use error::{Error, Result};
pub use header::{Headers, Sender, parse_sender};
pub use html::strip_html;
pub use language::{Language, detect_language};
pub use part::{Part, extract_body};
