//! `OAuth2` refresh-token exchange for the mailbox API.
//!
//! The interactive consent flow happens elsewhere; this module only turns a
//! stored refresh token into access tokens.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// Google token endpoint.
pub(crate) const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Tokens are refreshed this long before their stated expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Credentials needed to mint access tokens.
#[derive(Clone)]
pub struct GmailCredentials {
    /// `OAuth2` client ID.
    pub client_id: String,
    /// `OAuth2` client secret.
    pub client_secret: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
}

impl fmt::Debug for GmailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GmailCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[redacted]")
            .field("refresh_token", &"[redacted]")
            .finish()
    }
}

impl GmailCredentials {
    /// Checks that no field is blank.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first blank field.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
            ("refresh_token", &self.refresh_token),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

/// A short-lived access token.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Bearer token value.
    pub token: String,
    /// Expiration time, if the endpoint reported one.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Checks if the token is expired (with a 60 second buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .is_some_and(|exp| Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= exp)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Caching source of access tokens.
pub struct TokenSource {
    credentials: GmailCredentials,
    token_url: String,
    http: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSource")
            .field("credentials", &self.credentials)
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Creates a token source against the Google token endpoint.
    #[must_use]
    pub fn new(credentials: GmailCredentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            http,
            cached: Mutex::new(None),
        }
    }

    /// Overrides the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Returns a valid access token, refreshing it if needed.
    ///
    /// Concurrent callers wait on the same refresh instead of issuing their own.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh request fails or is rejected.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.token.clone());
        }

        let token = self.refresh().await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn refresh(&self) -> Result<AccessToken> {
        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", self.credentials.refresh_token.as_str());
        params.insert("client_id", self.credentials.client_id.as_str());
        params.insert("client_secret", self.credentials.client_secret.as_str());

        let response = self
            .http
            .post(&self.token_url)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => Error::OAuth {
                    error: err.error,
                    description: err.error_description,
                },
                Err(_) => Error::Api {
                    status: status.as_u16(),
                    message: body.chars().take(500).collect(),
                },
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::InvalidResponse(format!("token response: {e}")))?;

        debug!(expires_in = ?parsed.expires_in, "refreshed Gmail access token");

        Ok(AccessToken {
            token: parsed.access_token,
            expires_at: parsed
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
        })
    }
}
