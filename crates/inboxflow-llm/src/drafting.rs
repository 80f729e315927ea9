//! Reply, translation and ticket drafting over the Anthropic messages API.

use std::time::Duration;

use inboxflow_mime::Language;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::prompts;

/// Default messages endpoint base.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const API_VERSION: &str = "2023-06-01";

/// Drafting connection settings.
#[derive(Clone)]
pub struct DraftingConfig {
    /// API base URL; `/v1/messages` is appended.
    pub api_url: String,
    /// API key. Empty makes every call fail with [`Error::NotConfigured`].
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Language the operator reads; drafts are translated into it.
    pub pivot_language: Language,
}

impl Default for DraftingConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            pivot_language: Language::Chinese,
        }
    }
}

impl std::fmt::Debug for DraftingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftingConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("pivot_language", &self.pivot_language)
            .finish()
    }
}

/// Reply tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// Formal, professional and polite.
    #[default]
    Formal,
    /// Warm and relaxed.
    Friendly,
    /// Short and direct.
    Brief,
}

impl Tone {
    const fn describe(self) -> &'static str {
        match self {
            Self::Formal => "formal, professional and polite",
            Self::Friendly => "friendly, warm and relaxed",
            Self::Brief => "brief, direct and efficient",
        }
    }
}

/// Input for reply generation.
#[derive(Debug, Clone)]
pub struct ReplyRequest {
    /// Sender display name.
    pub from_name: String,
    /// Subject line.
    pub subject: String,
    /// Original message body.
    pub body: String,
    /// Desired tone.
    pub tone: Tone,
    /// Language of the original message; the reply is written in it.
    pub language: Language,
}

/// Generated reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyDraft {
    /// Reply in the message's language.
    pub reply: String,
    /// Reply translated into the pivot language; empty when not needed.
    pub translated_reply: String,
}

/// Input for ticket drafting.
#[derive(Debug, Clone, Default)]
pub struct TicketRequest {
    /// Sender display name.
    pub from_name: String,
    /// Sender address.
    pub from_email: String,
    /// Subject line.
    pub subject: String,
    /// Original body.
    pub body: String,
    /// Body already translated into the pivot language, if available.
    pub translated_body: Option<String>,
}

/// Ticket title and markdown description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketDraft {
    /// Ticket summary.
    pub title: String,
    /// Markdown description.
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct PartialDraft {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// LLM drafting client.
#[derive(Debug, Clone)]
pub struct DraftingClient {
    http: reqwest::Client,
    config: DraftingConfig,
}

impl DraftingClient {
    /// Creates a new drafting client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: DraftingConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self { http, config })
    }

    /// Returns true if an API key is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    /// The operator's language.
    #[must_use]
    pub const fn pivot_language(&self) -> Language {
        self.config.pivot_language
    }

    /// Drafts a reply in the message's language, plus a pivot-language
    /// translation when the two differ.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not configured or a call fails.
    pub async fn generate_reply(&self, request: &ReplyRequest) -> Result<ReplyDraft> {
        let system = prompts::reply_system(request.tone.describe(), request.language);
        let user = prompts::reply_user(&request.from_name, &request.subject, &request.body);
        let reply = self.complete(&system, &user, 1024, 0.7).await?;

        let translated_reply = if request.language != self.config.pivot_language && !reply.is_empty()
        {
            self.complete(
                &prompts::translate_system(self.config.pivot_language),
                &reply,
                1024,
                0.3,
            )
            .await?
        } else {
            String::new()
        };

        Ok(ReplyDraft {
            reply,
            translated_reply,
        })
    }

    /// Translates a message body into the pivot language.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for an empty body, or an error if the
    /// call fails.
    pub async fn translate(&self, body: &str) -> Result<String> {
        if body.trim().is_empty() {
            return Err(Error::InvalidInput("body is empty".into()));
        }
        self.complete(
            &prompts::translate_system(self.config.pivot_language),
            body,
            2048,
            0.3,
        )
        .await
    }

    /// Drafts a ticket title and description from a message.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not configured or the call fails.
    pub async fn draft_ticket(&self, request: &TicketRequest) -> Result<TicketDraft> {
        let user = prompts::ticket_user(
            &request.from_name,
            &request.from_email,
            &request.subject,
            &request.body,
            request.translated_body.as_deref(),
            self.config.pivot_language,
        );
        let raw = self.complete(prompts::TICKET_SYSTEM, &user, 2048, 0.5).await?;
        Ok(parse_draft(&raw, &request.subject))
    }

    /// Turns free-form requirement text into a ticket draft.
    ///
    /// When both `previous` and `feedback` are given, the model refines the
    /// previous draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for empty text, or an error if the call
    /// fails.
    pub async fn analyze_requirement(
        &self,
        text: &str,
        previous: Option<&TicketDraft>,
        feedback: Option<&str>,
    ) -> Result<TicketDraft> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput("requirement text is empty".into()));
        }
        let user = prompts::requirement_user(
            text,
            previous.map(|d| (d.title.as_str(), d.description.as_str())),
            feedback.filter(|f| !f.trim().is_empty()),
            self.config.pivot_language,
        );
        let raw = self
            .complete(prompts::REQUIREMENT_SYSTEM, &user, 4096, 0.5)
            .await?;
        Ok(parse_draft(&raw, ""))
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
        temperature: f64,
    ) -> Result<String> {
        if !self.is_configured() {
            return Err(Error::NotConfigured("ANTHROPIC_API_KEY is not set".into()));
        }

        let body = json!({
            "model": self.config.model,
            "max_tokens": max_tokens,
            "temperature": temperature,
            "system": system,
            "messages": [{"role": "user", "content": user}],
        });

        let url = format!("{}/v1/messages", self.config.api_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!(status = %status, "drafting response received");

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map_or_else(|_| text.chars().take(500).collect(), |e| e.error.message);
            warn!(status = %status, message = %message, "drafting request failed");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        Ok(parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .unwrap_or_default()
            .trim()
            .to_string())
    }
}

/// Parses `{title, description}` model output; non-JSON output becomes the
/// description verbatim.
fn parse_draft(raw: &str, fallback_title: &str) -> TicketDraft {
    let cleaned = prompts::strip_code_fences(raw);
    match serde_json::from_str::<PartialDraft>(cleaned) {
        Ok(draft) => TicketDraft {
            title: draft
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| fallback_title.to_string()),
            description: draft.description.unwrap_or_default(),
        },
        Err(e) => {
            warn!(error = %e, "draft output is not JSON, using raw text");
            TicketDraft {
                title: fallback_title.to_string(),
                description: raw.trim().to_string(),
            }
        }
    }
}
