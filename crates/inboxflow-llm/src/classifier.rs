//! Batch importance classifier over an OpenAI-compatible chat API.

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::prompts;

/// Default API base (`DeepSeek`).
pub const DEFAULT_API_URL: &str = "https://api.deepseek.com";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "deepseek-chat";

/// Classifier connection settings.
#[derive(Clone)]
pub struct ClassifierConfig {
    /// API base URL; `/v1/chat/completions` is appended.
    pub api_url: String,
    /// Bearer token. Empty disables classification.
    pub api_key: String,
    /// Model name.
    pub model: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// One message as seen by the classifier.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyInput<'a> {
    /// Message id, echoed back in the verdict map.
    pub id: &'a str,
    /// Sender display name.
    pub from_name: &'a str,
    /// Sender address.
    pub from_email: &'a str,
    /// Subject line.
    pub subject: &'a str,
    /// Plain text body; only a preview is sent.
    pub body: &'a str,
}

/// Importance judgment for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    /// Importance in `0..=100`.
    pub score: u8,
    /// Whether the message should be shown.
    pub visible: bool,
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    id: String,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    visible: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Importance classifier.
///
/// Never fails from the caller's point of view: transport errors, bad
/// responses and a missing API key all yield an empty verdict map.
#[derive(Debug, Clone)]
pub struct ClassifierClient {
    http: reqwest::Client,
    config: ClassifierConfig,
}

impl ClassifierClient {
    /// Creates a new classifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { http, config })
    }

    /// Returns true if an API key is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.config.api_key.trim().is_empty()
    }

    /// Scores a batch of messages.
    ///
    /// Ids missing from the response are missing from the result.
    pub async fn classify(&self, messages: &[ClassifyInput<'_>]) -> HashMap<String, Verdict> {
        if messages.is_empty() {
            return HashMap::new();
        }
        if !self.is_configured() {
            debug!(count = messages.len(), "classifier not configured, skipping");
            return HashMap::new();
        }

        info!(count = messages.len(), "classifying messages");
        match self.request(messages).await {
            Ok(verdicts) => {
                debug!(returned = verdicts.len(), "classifier verdicts received");
                verdicts
            }
            Err(e) => {
                warn!(error = %e, count = messages.len(), "classification failed");
                HashMap::new()
            }
        }
    }

    async fn request(&self, messages: &[ClassifyInput<'_>]) -> Result<HashMap<String, Verdict>> {
        let user = prompts::classifier_batch(
            messages
                .iter()
                .map(|m| (m.id, m.from_name, m.from_email, m.subject, m.body)),
        );

        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": prompts::CLASSIFIER_SYSTEM},
                {"role": "user", "content": user},
            ],
            "temperature": 0.1,
            "max_tokens": 2048,
            "response_format": {"type": "json_object"},
        });

        let url = format!(
            "{}/v1/chat/completions",
            self.config.api_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: text.chars().take(500).collect(),
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        parse_verdicts(&content)
    }
}

/// Parses the model output into verdicts.
///
/// Accepts a bare array or an object wrapping it under `results` or `emails`.
fn parse_verdicts(content: &str) -> Result<HashMap<String, Verdict>> {
    let cleaned = prompts::strip_code_fences(content);
    let value: serde_json::Value = serde_json::from_str(cleaned).map_err(|e| {
        let head: String = cleaned.chars().take(200).collect();
        Error::InvalidResponse(format!("{e}: {head}"))
    })?;

    let list = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut map) => map
            .remove("results")
            .or_else(|| map.remove("emails"))
            .unwrap_or_else(|| serde_json::Value::Array(Vec::new())),
        _ => return Err(Error::InvalidResponse("expected array or object".into())),
    };

    let raw: Vec<RawVerdict> =
        serde_json::from_value(list).map_err(|e| Error::InvalidResponse(e.to_string()))?;

    Ok(raw
        .into_iter()
        .map(|r| {
            let verdict = Verdict {
                score: clamp_score(r.score.unwrap_or(50.0)),
                visible: r.visible.unwrap_or(true),
            };
            (r.id, verdict)
        })
        .collect())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(score: f64) -> u8 {
    if score.is_nan() {
        return 50;
    }
    score.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn input(id: &str) -> ClassifyInput<'_> {
        ClassifyInput {
            id,
            from_name: "Ann",
            from_email: "ann@example.com",
            subject: "Outage",
            body: "Checkout is down",
        }
    }

    fn client(server: &MockServer) -> ClassifierClient {
        ClassifierClient::new(ClassifierConfig {
            api_url: server.uri(),
            api_key: "sk-test".into(),
            ..ClassifierConfig::default()
        })
        .unwrap()
    }

    fn chat(content: &str) -> serde_json::Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[test]
    fn test_parse_array() {
        let verdicts =
            parse_verdicts(r#"[{"id":"a","score":90,"visible":true},{"id":"b","score":10,"visible":false}]"#)
                .unwrap();
        assert_eq!(verdicts["a"], Verdict { score: 90, visible: true });
        assert_eq!(verdicts["b"], Verdict { score: 10, visible: false });
    }

    #[test]
    fn test_parse_wrapped_and_fenced() {
        let verdicts =
            parse_verdicts("```json\n{\"emails\": [{\"id\": \"a\", \"score\": 70}]}\n```").unwrap();
        assert_eq!(verdicts["a"], Verdict { score: 70, visible: true });

        let verdicts = parse_verdicts(r#"{"results": [{"id": "b", "score": 55.6}]}"#).unwrap();
        assert_eq!(verdicts["b"].score, 56);

        assert!(parse_verdicts(r#"{"other": 1}"#).unwrap().is_empty());
    }

    #[test]
    fn test_scores_are_clamped() {
        let verdicts = parse_verdicts(r#"[{"id":"hi","score":150},{"id":"lo","score":-5}]"#).unwrap();
        assert_eq!(verdicts["hi"].score, 100);
        assert_eq!(verdicts["lo"].score, 0);
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(matches!(
            parse_verdicts("I cannot help with that"),
            Err(Error::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_classify_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "deepseek-chat",
                "temperature": 0.1,
                "response_format": {"type": "json_object"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat(
                r#"{"results":[{"id":"m1","score":92,"visible":true},{"id":"m2","score":5,"visible":false}]}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let verdicts = client(&server).classify(&[input("m1"), input("m2")]).await;
        assert_eq!(verdicts.len(), 2);
        assert_eq!(verdicts["m1"].score, 92);
        assert!(!verdicts["m2"].visible);
    }

    #[tokio::test]
    async fn test_classify_degrades_on_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let verdicts = client(&server).classify(&[input("m1")]).await;
        assert!(verdicts.is_empty());
    }

    #[tokio::test]
    async fn test_classify_degrades_on_unparseable_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat("not json")))
            .mount(&server)
            .await;

        assert!(client(&server).classify(&[input("m1")]).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat("[]")))
            .expect(0)
            .mount(&server)
            .await;

        assert!(client(&server).classify(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat("[]")))
            .expect(0)
            .mount(&server)
            .await;

        let classifier = ClassifierClient::new(ClassifierConfig {
            api_url: server.uri(),
            ..ClassifierConfig::default()
        })
        .unwrap();
        assert!(!classifier.is_configured());
        assert!(classifier.classify(&[input("m1")]).await.is_empty());
    }
}
