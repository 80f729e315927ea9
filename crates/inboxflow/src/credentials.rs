//! Secret lookup in the system keyring.
//!
//! Secrets that are neither in the settings file nor in the environment can
//! be stored with the platform's native credential storage:
//! - Linux: Secret Service (GNOME Keyring, `KWallet`)
//! - macOS: Keychain
//! - Windows: Credential Manager
//!
//! Entries live under service `inboxflow`, keyed by the environment variable
//! name of the secret (e.g. `JIRA_API_TOKEN`).

use keyring::Entry;
use tracing::{debug, warn};

use crate::config::Settings;

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "inboxflow";

/// Error type for credential operations.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// Failed to access keyring.
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type for credential operations.
pub type CredentialResult<T> = std::result::Result<T, CredentialError>;

/// Retrieves a secret from the system keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn get_secret(name: &str) -> CredentialResult<Option<String>> {
    let entry = Entry::new(SERVICE_NAME, name)?;
    match entry.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => {
            debug!(name, "no keyring entry");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Fills empty secret fields of `settings` from the keyring.
///
/// Keyring failures are logged and leave the field empty.
pub fn fill_missing_secrets(settings: &mut Settings) {
    fill_missing_secrets_with(settings, get_secret);
}

fn fill_missing_secrets_with<F>(settings: &mut Settings, lookup: F)
where
    F: Fn(&str) -> CredentialResult<Option<String>>,
{
    let slots: [(&str, &mut String); 5] = [
        ("GMAIL_CLIENT_SECRET", &mut settings.gmail.client_secret),
        ("GMAIL_REFRESH_TOKEN", &mut settings.gmail.refresh_token),
        ("DEEPSEEK_API_KEY", &mut settings.classifier.api_key),
        ("ANTHROPIC_API_KEY", &mut settings.drafting.api_key),
        ("JIRA_API_TOKEN", &mut settings.jira.api_token),
    ];

    for (name, slot) in slots {
        if !slot.is_empty() {
            continue;
        }
        match lookup(name) {
            Ok(Some(secret)) => {
                debug!(name, "secret loaded from keyring");
                *slot = secret;
            }
            Ok(None) => {}
            Err(e) => warn!(name, error = %e, "keyring lookup failed"),
        }
    }

    if settings.cron_secret.is_none() {
        match lookup("CRON_SECRET") {
            Ok(secret) => settings.cron_secret = secret,
            Err(e) => warn!(error = %e, "keyring lookup failed for CRON_SECRET"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_only_empty_fields() {
        let mut settings = Settings::default();
        settings.jira.api_token = "from-env".into();

        fill_missing_secrets_with(&mut settings, |name| Ok(Some(format!("kr-{name}"))));

        assert_eq!(settings.jira.api_token, "from-env");
        assert_eq!(settings.drafting.api_key, "kr-ANTHROPIC_API_KEY");
        assert_eq!(settings.gmail.refresh_token, "kr-GMAIL_REFRESH_TOKEN");
        assert_eq!(settings.cron_secret.as_deref(), Some("kr-CRON_SECRET"));
    }

    #[test]
    fn test_keyring_failure_leaves_fields_empty() {
        let mut settings = Settings::default();

        fill_missing_secrets_with(&mut settings, |_| {
            Err(CredentialError::Keyring(keyring::Error::NoStorageAccess(
                "locked".into(),
            )))
        });

        assert!(settings.classifier.api_key.is_empty());
        assert!(settings.cron_secret.is_none());
    }
}
