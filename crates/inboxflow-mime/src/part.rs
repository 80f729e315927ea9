//! MIME part tree and body selection.

use crate::encoding::decode_base64url_text;
use crate::error::Result;
use crate::html::strip_html;

/// One node of a message's MIME tree.
///
/// Leaf parts carry URL-safe Base64 body data; multipart containers carry
/// child parts. This mirrors the payload shape of mailbox REST APIs.
#[derive(Debug, Clone, Default)]
pub struct Part {
    /// Media type, e.g. `text/plain` or `multipart/alternative`.
    pub mime_type: String,
    /// Encoded body data, if the part carries inline content.
    pub data: Option<String>,
    /// Child parts of a multipart container.
    pub parts: Vec<Part>,
}

impl Part {
    /// Creates a leaf part with encoded body data.
    #[must_use]
    pub fn leaf(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: Some(data.into()),
            parts: Vec::new(),
        }
    }

    /// Creates a multipart container.
    #[must_use]
    pub fn multipart(mime_type: impl Into<String>, parts: Vec<Self>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: None,
            parts,
        }
    }

    /// Returns true if this part's media type equals `essence` (parameters ignored).
    #[must_use]
    pub fn is_type(&self, essence: &str) -> bool {
        self.mime_type
            .split(';')
            .next()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(essence))
    }

    fn inline_data(&self) -> Option<&str> {
        self.data.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Depth-first search for the first part of `essence` with inline data.
    fn find(&self, essence: &str) -> Option<&Self> {
        if self.is_type(essence) && self.inline_data().is_some() {
            return Some(self);
        }
        self.parts.iter().find_map(|p| p.find(essence))
    }
}

/// Extracts the readable body of a message.
///
/// Preference order:
/// 1. the first `text/plain` part anywhere in the tree
/// 2. the first `text/html` part, flattened to text
/// 3. inline data on the root part, whatever its type
///
/// Returns an empty string when nothing usable is present.
///
/// # Errors
///
/// Returns an error if the selected part's data is not valid Base64 or the
/// HTML cannot be converted.
pub fn extract_body(root: &Part) -> Result<String> {
    if let Some(part) = root.find("text/plain") {
        return decode_part(part);
    }

    if let Some(part) = root.find("text/html") {
        let html = decode_part(part)?;
        return strip_html(&html);
    }

    match root.inline_data() {
        Some(data) => decode_base64url_text(data),
        None => Ok(String::new()),
    }
}

fn decode_part(part: &Part) -> Result<String> {
    part.inline_data()
        .map_or_else(|| Ok(String::new()), decode_base64url_text)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::encoding::encode_base64url;

    fn leaf(mime_type: &str, text: &str) -> Part {
        Part::leaf(mime_type, encode_base64url(text.as_bytes()))
    }

    #[test]
    fn test_single_part_plain() {
        let root = leaf("text/plain; charset=utf-8", "Hello");
        assert_eq!(extract_body(&root).unwrap(), "Hello");
    }

    #[test]
    fn test_prefers_plain_over_html() {
        let root = Part::multipart(
            "multipart/alternative",
            vec![leaf("text/html", "<p>Rich</p>"), leaf("text/plain", "Plain")],
        );
        assert_eq!(extract_body(&root).unwrap(), "Plain");
    }

    #[test]
    fn test_html_only_is_stripped() {
        let root = Part::multipart(
            "multipart/alternative",
            vec![leaf("text/html", "<div><p>Only html</p></div>")],
        );
        assert_eq!(extract_body(&root).unwrap(), "Only html");
    }

    #[test]
    fn test_single_part_html_is_stripped() {
        let root = leaf("text/html", "<p>Server down</p>");
        assert_eq!(extract_body(&root).unwrap(), "Server down");
    }

    #[test]
    fn test_nested_multipart() {
        let root = Part::multipart(
            "multipart/mixed",
            vec![
                Part::multipart(
                    "multipart/alternative",
                    vec![leaf("text/html", "<b>x</b>"), leaf("text/plain", "Nested plain")],
                ),
                Part {
                    mime_type: "application/pdf".into(),
                    data: None,
                    parts: Vec::new(),
                },
            ],
        );
        assert_eq!(extract_body(&root).unwrap(), "Nested plain");
    }

    #[test]
    fn test_plain_deep_beats_html_shallow() {
        let root = Part::multipart(
            "multipart/mixed",
            vec![
                leaf("text/html", "<p>shallow</p>"),
                Part::multipart("multipart/alternative", vec![leaf("text/plain", "deep")]),
            ],
        );
        assert_eq!(extract_body(&root).unwrap(), "deep");
    }

    #[test]
    fn test_empty_tree() {
        let root = Part::multipart("multipart/mixed", Vec::new());
        assert_eq!(extract_body(&root).unwrap(), "");
    }

    #[test]
    fn test_empty_plain_part_is_skipped() {
        let root = Part::multipart(
            "multipart/alternative",
            vec![Part::leaf("text/plain", ""), leaf("text/html", "<p>fallback</p>")],
        );
        assert_eq!(extract_body(&root).unwrap(), "fallback");
    }
}
