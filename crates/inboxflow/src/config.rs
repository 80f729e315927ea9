//! Service settings.
//!
//! Settings come from `settings.json` in the user config directory, then
//! environment variables override individual fields. Secrets still missing
//! after that are looked up in the system keyring (see [`crate::credentials`]).

use std::path::{Path, PathBuf};

use anyhow::Context;
use inboxflow_core::{
    ClassifierConfig, DraftingConfig, GmailCredentials, JiraConfig, Language,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Gmail API settings.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GmailSettings {
    /// `OAuth2` client ID.
    pub client_id: String,
    /// `OAuth2` client secret.
    pub client_secret: String,
    /// Long-lived refresh token.
    pub refresh_token: String,
    /// Label ids every fetched message must carry.
    pub label_ids: Vec<String>,
}

impl GmailSettings {
    /// All three credential parts are present.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.is_empty()
            && !self.refresh_token.is_empty()
    }

    /// Credentials for the Gmail client.
    #[must_use]
    pub fn credentials(&self) -> GmailCredentials {
        GmailCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

/// Classifier LLM settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// OpenAI-compatible API base.
    pub api_url: String,
    /// API key; empty disables classification.
    pub api_key: String,
    /// Model name.
    pub model: String,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        let defaults = ClassifierConfig::default();
        Self {
            api_url: defaults.api_url,
            api_key: defaults.api_key,
            model: defaults.model,
        }
    }
}

/// Drafting LLM settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftingSettings {
    /// Messages API base.
    pub api_url: String,
    /// API key; empty makes drafting endpoints answer 503.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Language drafts are translated into.
    pub pivot_language: Language,
}

impl Default for DraftingSettings {
    fn default() -> Self {
        let defaults = DraftingConfig::default();
        Self {
            api_url: defaults.api_url,
            api_key: defaults.api_key,
            model: defaults.model,
            pivot_language: defaults.pivot_language,
        }
    }
}

/// Jira Cloud settings.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraSettings {
    /// Site URL, e.g. `https://example.atlassian.net`.
    pub base_url: String,
    /// Account email for basic auth.
    pub email: String,
    /// API token for basic auth.
    pub api_token: String,
    /// Project new issues are created in.
    pub project_key: String,
}

/// Service settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listen address.
    pub bind: String,
    /// `SQLite` database file. Defaults to the user data directory.
    pub database: Option<PathBuf>,
    /// Shared secret for the scheduled fetch endpoint.
    pub cron_secret: Option<String>,
    /// Sender addresses whose mail is dropped before classification.
    pub blocked_senders: Vec<String>,
    /// Mailbox.
    pub gmail: GmailSettings,
    /// Importance classifier.
    pub classifier: ClassifierSettings,
    /// Reply and ticket drafting.
    pub drafting: DraftingSettings,
    /// Issue tracker.
    pub jira: JiraSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            database: None,
            cron_secret: None,
            blocked_senders: Vec::new(),
            gmail: GmailSettings::default(),
            classifier: ClassifierSettings::default(),
            drafting: DraftingSettings::default(),
            jira: JiraSettings::default(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("bind", &self.bind)
            .field("database", &self.database)
            .field("cron_secret", &self.cron_secret.as_ref().map(|_| "[redacted]"))
            .field("blocked_senders", &self.blocked_senders)
            .field("gmail", &self.gmail.is_configured())
            .field("classifier", &!self.classifier.api_key.is_empty())
            .field("drafting", &!self.drafting.api_key.is_empty())
            .field("jira", &self.jira_config().is_configured())
            .finish()
    }
}

impl Settings {
    /// Path of the settings file.
    #[must_use]
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("inboxflow")
            .join("settings.json")
    }

    /// Loads settings from the default file, the process environment and the
    /// keyring, in increasing precedence except for the keyring, which only
    /// fills secrets that are still empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be read or
    /// parsed.
    pub async fn load() -> anyhow::Result<Self> {
        let mut settings = Self::from_file(&Self::path()).await?;
        settings.apply_env(|name| std::env::var(name).ok());
        crate::credentials::fill_missing_secrets(&mut settings);
        Ok(settings)
    }

    /// Reads a settings file. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let settings = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Overrides fields from environment variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = var("GMAIL_CLIENT_ID") {
            self.gmail.client_id = v;
        }
        if let Some(v) = var("GMAIL_CLIENT_SECRET") {
            self.gmail.client_secret = v;
        }
        if let Some(v) = var("GMAIL_REFRESH_TOKEN") {
            self.gmail.refresh_token = v;
        }
        if let Some(v) = var("GMAIL_LABEL_IDS") {
            self.gmail.label_ids = split_list(&v);
        }
        if let Some(v) = var("DEEPSEEK_API_URL") {
            self.classifier.api_url = v;
        }
        if let Some(v) = var("DEEPSEEK_API_KEY") {
            self.classifier.api_key = v;
        }
        if let Some(v) = var("ANTHROPIC_API_KEY") {
            self.drafting.api_key = v;
        }
        if let Some(v) = var("ANTHROPIC_MODEL") {
            self.drafting.model = v;
        }
        if let Some(v) = var("JIRA_BASE_URL") {
            self.jira.base_url = v;
        }
        if let Some(v) = var("JIRA_EMAIL") {
            self.jira.email = v;
        }
        if let Some(v) = var("JIRA_API_TOKEN") {
            self.jira.api_token = v;
        }
        if let Some(v) = var("JIRA_PROJECT_KEY") {
            self.jira.project_key = v;
        }
        if let Some(v) = var("CRON_SECRET") {
            self.cron_secret = Some(v);
        }
        if let Some(v) = var("INBOXFLOW_DATABASE") {
            self.database = Some(PathBuf::from(v));
        }
        if let Some(v) = var("INBOXFLOW_BIND") {
            self.bind = v;
        }
        if let Some(v) = var("INBOXFLOW_BLOCKED_SENDERS") {
            self.blocked_senders = split_list(&v);
        }
    }

    /// Database file, falling back to `<data dir>/inboxflow/inboxflow.db`.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("inboxflow")
                .join("inboxflow.db")
        })
    }

    /// Classifier client settings.
    #[must_use]
    pub fn classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            api_url: self.classifier.api_url.clone(),
            api_key: self.classifier.api_key.clone(),
            model: self.classifier.model.clone(),
        }
    }

    /// Drafting client settings.
    #[must_use]
    pub fn drafting_config(&self) -> DraftingConfig {
        DraftingConfig {
            api_url: self.drafting.api_url.clone(),
            api_key: self.drafting.api_key.clone(),
            model: self.drafting.model.clone(),
            pivot_language: self.drafting.pivot_language,
        }
    }

    /// Jira client settings.
    #[must_use]
    pub fn jira_config(&self) -> JiraConfig {
        JiraConfig {
            base_url: self.jira.base_url.trim_end_matches('/').to_string(),
            email: self.jira.email.clone(),
            api_token: self.jira.api_token.clone(),
            project_key: self.jira.project_key.clone(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.bind, DEFAULT_BIND);
        assert_eq!(settings.classifier.model, "deepseek-chat");
        assert_eq!(settings.drafting.pivot_language, Language::Chinese);
        assert!(!settings.gmail.is_configured());
        assert!(settings.cron_secret.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{"bind": "0.0.0.0:8080", "jira": {"project_key": "SUP"}, "drafting": {"pivot_language": "japanese"}}"#,
        )
        .unwrap();

        assert_eq!(settings.bind, "0.0.0.0:8080");
        assert_eq!(settings.jira.project_key, "SUP");
        assert_eq!(settings.drafting.pivot_language, Language::Japanese);
        assert_eq!(settings.drafting.model, DraftingConfig::default().model);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("GMAIL_CLIENT_ID", "id"),
            ("GMAIL_CLIENT_SECRET", "secret"),
            ("GMAIL_REFRESH_TOKEN", "refresh"),
            ("GMAIL_LABEL_IDS", "INBOX, Label_7,,"),
            ("JIRA_BASE_URL", "https://example.atlassian.net/"),
            ("CRON_SECRET", "s3cret"),
            ("INBOXFLOW_BLOCKED_SENDERS", "spam@example.com"),
            ("ANTHROPIC_MODEL", "   "),
        ]);
        let mut settings = Settings::default();
        settings.apply_env(|name| env.get(name).map(ToString::to_string));

        assert!(settings.gmail.is_configured());
        assert_eq!(settings.gmail.label_ids, vec!["INBOX", "Label_7"]);
        assert_eq!(settings.cron_secret.as_deref(), Some("s3cret"));
        assert_eq!(settings.blocked_senders, vec!["spam@example.com"]);
        assert_eq!(settings.jira_config().base_url, "https://example.atlassian.net");
        assert_eq!(settings.drafting.model, DraftingConfig::default().model);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut settings = Settings::default();
        settings.cron_secret = Some("s3cret".into());
        settings.jira.api_token = "token".into();
        let debug = format!("{settings:?}");
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("token"));
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("inboxflow-missing-settings.json");
        let settings = Settings::from_file(&path).await.unwrap();
        assert_eq!(settings.bind, DEFAULT_BIND);
    }
}
