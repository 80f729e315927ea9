//! Gmail API payloads and their normalized form.

use chrono::{DateTime, TimeZone, Utc};
use inboxflow_mime::{Headers, Language, Part, detect_language, extract_body, parse_sender};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// System label marking unread messages.
const UNREAD_LABEL: &str = "UNREAD";

/// Prefix of Gmail's automatic category labels.
const CATEGORY_PREFIX: &str = "CATEGORY_";

/// Maximum number of labels carried over as tags.
const MAX_TAGS: usize = 3;

/// A mailbox label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Label id, used in label filters.
    #[serde(default)]
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// `system` or `user`.
    #[serde(default, rename = "type")]
    pub kind: String,
}

/// A normalized inbound message.
#[derive(Debug, Clone)]
pub struct MailMessage {
    /// Provider message id.
    pub id: String,
    /// Sender display name.
    pub from_name: String,
    /// Sender address.
    pub from_email: String,
    /// Subject line.
    pub subject: String,
    /// Readable body text.
    pub body: String,
    /// Detected body language.
    pub language: Language,
    /// Up to three user-facing labels.
    pub tags: Vec<String>,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
    /// Whether the provider marks the message unread.
    pub unread: bool,
    /// Priority the mailbox already assigned, used when no classifier verdict exists.
    pub default_score: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LabelList {
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageList {
    #[serde(default)]
    pub messages: Vec<MessageRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawMessage {
    pub id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
    #[serde(default)]
    pub internal_date: Option<String>,
    #[serde(default)]
    pub payload: Option<RawPart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPart {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub headers: Vec<RawHeader>,
    #[serde(default)]
    pub body: Option<RawBody>,
    #[serde(default)]
    pub parts: Vec<RawPart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawHeader {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBody {
    #[serde(default)]
    pub data: Option<String>,
}

impl RawPart {
    fn to_part(&self) -> Part {
        Part {
            mime_type: self.mime_type.clone(),
            data: self.body.as_ref().and_then(|b| b.data.clone()),
            parts: self.parts.iter().map(Self::to_part).collect(),
        }
    }
}

impl RawMessage {
    /// Normalizes the payload into a [`MailMessage`].
    ///
    /// Undecodable bodies are logged and replaced by an empty string; they do
    /// not fail the whole fetch.
    pub(crate) fn normalize(self) -> MailMessage {
        let payload = self.payload.unwrap_or_default();
        let headers = Headers::from_pairs(
            payload
                .headers
                .iter()
                .map(|h| (h.name.as_str(), h.value.as_str())),
        );

        let sender = parse_sender(headers.get_or_empty("From"));
        let body = extract_body(&payload.to_part()).unwrap_or_else(|e| {
            warn!(message_id = %self.id, error = %e, "failed to decode message body");
            String::new()
        });
        let language = detect_language(&body);

        let received_at = parse_date(headers.get_or_empty("Date"))
            .or_else(|| self.internal_date.as_deref().and_then(parse_internal_date))
            .unwrap_or_else(Utc::now);

        let unread = self.label_ids.iter().any(|l| l == UNREAD_LABEL);
        let tags = self
            .label_ids
            .into_iter()
            .filter(|l| !l.starts_with(CATEGORY_PREFIX) && l != UNREAD_LABEL)
            .take(MAX_TAGS)
            .collect();

        MailMessage {
            id: self.id,
            from_name: sender.name,
            from_email: sender.email,
            subject: headers.get_or_empty("Subject").to_string(),
            body,
            language,
            tags,
            received_at,
            unread,
            default_score: None,
        }
    }
}

/// Parses an RFC 2822 `Date` header, tolerating a trailing `(UTC)` comment.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.split(" (").next().unwrap_or(raw).trim();
    if trimmed.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc2822(trimmed)
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Parses the provider's internal timestamp (milliseconds since the epoch).
fn parse_internal_date(raw: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = raw.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use inboxflow_mime::encoding::encode_base64url;

    fn raw(json: serde_json::Value) -> RawMessage {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_normalize_full_message() {
        let message = raw(serde_json::json!({
            "id": "18c0a",
            "labelIds": ["UNREAD", "CATEGORY_UPDATES", "Label_1", "INBOX", "Label_2", "Label_3"],
            "internalDate": "1700000000000",
            "payload": {
                "mimeType": "multipart/alternative",
                "headers": [
                    {"name": "From", "value": "\"Max Weber\" <max.weber@example.de>"},
                    {"name": "Subject", "value": "Dringende Fehlerbehebung"},
                    {"name": "Date", "value": "Tue, 14 Nov 2023 22:13:20 +0000"}
                ],
                "parts": [
                    {"mimeType": "text/plain", "body": {"data": encode_base64url("Straße gesperrt".as_bytes())}},
                    {"mimeType": "text/html", "body": {"data": encode_base64url(b"<p>ignored</p>")}}
                ]
            }
        }))
        .normalize();

        assert_eq!(message.id, "18c0a");
        assert_eq!(message.from_name, "Max Weber");
        assert_eq!(message.from_email, "max.weber@example.de");
        assert_eq!(message.subject, "Dringende Fehlerbehebung");
        assert_eq!(message.body, "Straße gesperrt");
        assert_eq!(message.language, Language::German);
        assert_eq!(message.tags, vec!["Label_1", "INBOX", "Label_2"]);
        assert!(message.unread);
        assert_eq!(message.received_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_normalize_falls_back_to_internal_date() {
        let message = raw(serde_json::json!({
            "id": "m1",
            "labelIds": ["INBOX"],
            "internalDate": "1700000000000",
            "payload": {"mimeType": "text/plain", "headers": [], "body": {"data": "SGk"}}
        }))
        .normalize();

        assert_eq!(message.received_at.timestamp(), 1_700_000_000);
        assert!(!message.unread);
        assert_eq!(message.body, "Hi");
        assert_eq!(message.from_email, "");
    }

    #[test]
    fn test_normalize_bad_body_is_empty() {
        let message = raw(serde_json::json!({
            "id": "m2",
            "payload": {"mimeType": "text/plain", "body": {"data": "!!!"}}
        }))
        .normalize();

        assert_eq!(message.body, "");
        assert_eq!(message.language, Language::English);
    }

    #[test]
    fn test_parse_date_with_comment() {
        let date = parse_date("Tue, 14 Nov 2023 22:13:20 +0000 (UTC)").unwrap();
        assert_eq!(date.timestamp(), 1_700_000_000);
        assert!(parse_date("").is_none());
        assert!(parse_date("yesterday").is_none());
    }
}
