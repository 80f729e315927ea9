//! Header lookup and sender parsing.

use std::collections::HashMap;

/// Collection of message headers with case-insensitive names.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from `(name, value)` pairs as returned by REST APIs.
    pub fn from_pairs<I, N, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.add(name, value);
        }
        headers
    }

    /// Adds a header value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        self.headers.entry(name).or_default().push(value.into());
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// Gets the first value for a header, or an empty string.
    #[must_use]
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }
}

/// Display name and address of a message sender.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sender {
    /// Display name (falls back to the local part or the raw value).
    pub name: String,
    /// Email address.
    pub email: String,
}

/// Parses a `From` header value.
///
/// - `"Jane Doe" <jane@example.com>` yields name `Jane Doe`
/// - `jane@example.com` yields name `jane`
/// - anything else is used verbatim for both fields
#[must_use]
pub fn parse_sender(raw: &str) -> Sender {
    let raw = raw.trim();

    if let (Some(open), true) = (raw.rfind('<'), raw.ends_with('>')) {
        let email = raw[open + 1..raw.len() - 1].trim();
        let name = raw[..open].trim().trim_matches('"').trim();
        if !name.is_empty() && !email.is_empty() {
            return Sender {
                name: name.to_string(),
                email: email.to_string(),
            };
        }
        if !email.is_empty() {
            return parse_sender(email);
        }
    }

    if let Some((local, _)) = raw.split_once('@') {
        return Sender {
            name: local.to_string(),
            email: raw.to_string(),
        };
    }

    Sender {
        name: raw.to_string(),
        email: raw.to_string(),
    }
}
