//! # inboxflow-llm
//!
//! Language model collaborators for inboxflow.
//!
//! ## Features
//!
//! - **Classifier**: Scores a batch of messages 0-100 and decides whether each
//!   one is worth showing, over an OpenAI-compatible chat completions API.
//!   Failures degrade to an empty result instead of an error.
//! - **Drafting**: Reply generation with optional translation into the
//!   operator's pivot language, message translation, ticket drafting and
//!   requirement analysis, over the Anthropic messages API.
//!
//! ## Quick Start
//!
//! ```ignore
//! use inboxflow_llm::{ClassifierClient, ClassifierConfig, ClassifyInput};
//!
//! let classifier = ClassifierClient::new(ClassifierConfig {
//!     api_key: std::env::var("DEEPSEEK_API_KEY").unwrap_or_default(),
//!     ..ClassifierConfig::default()
//! })?;
//!
//! let verdicts = classifier.classify(&inputs).await;
//! for (id, verdict) in &verdicts {
//!     println!("{id}: {} visible={}", verdict.score, verdict.visible);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod classifier;
mod drafting;
mod error;
mod prompts;

pub use classifier::{ClassifierClient, ClassifierConfig, ClassifyInput, Verdict};
pub use drafting::{
    DraftingClient, DraftingConfig, ReplyDraft, ReplyRequest, TicketDraft, TicketRequest, Tone,
};
pub use error::{Error, Result};
