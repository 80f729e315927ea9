//! Shared handler state and its construction from settings.

use std::sync::Arc;

use anyhow::Context;
use inboxflow_core::{
    CacheStore, Classifier, ClassifierClient, DemoMailbox, DraftingClient, GmailClient,
    JiraClient, Mailbox, Reconciler, RequirementRepository, Tracker, Workflow,
};
use tracing::{info, warn};

use crate::auth::CronAuth;
use crate::config::Settings;

/// External collaborators of the service.
pub struct Collaborators {
    /// Message source.
    pub mailbox: Arc<dyn Mailbox>,
    /// Importance classifier.
    pub classifier: Arc<dyn Classifier>,
    /// Issue tracker.
    pub tracker: Arc<dyn Tracker>,
    /// Reply and ticket drafting.
    pub drafting: DraftingClient,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Refresh cycle engine.
    pub reconciler: Reconciler,
    /// Score and status cache.
    pub store: Arc<CacheStore>,
    /// Workflow transitions.
    pub workflow: Workflow,
    /// Issue tracker.
    pub tracker: Arc<dyn Tracker>,
    /// Drafting client.
    pub drafting: Arc<DraftingClient>,
    /// Requirement ticket storage.
    pub requirements: RequirementRepository,
    /// Label filter for every fetch.
    pub label_ids: Vec<String>,
    /// Cron endpoint authentication.
    pub cron: CronAuth,
}

impl AppState {
    /// Wires the engine and workflow around shared stores.
    #[must_use]
    pub fn new(
        store: Arc<CacheStore>,
        requirements: RequirementRepository,
        collaborators: Collaborators,
    ) -> Self {
        let Collaborators {
            mailbox,
            classifier,
            tracker,
            drafting,
        } = collaborators;

        Self {
            reconciler: Reconciler::new(
                Arc::clone(&store),
                mailbox,
                classifier,
                Arc::clone(&tracker),
            ),
            workflow: Workflow::new(Arc::clone(&store), Arc::clone(&tracker)),
            store,
            tracker,
            drafting: Arc::new(drafting),
            requirements,
            label_ids: Vec::new(),
            cron: CronAuth::default(),
        }
    }

    /// Restricts fetches to messages carrying all of `label_ids`.
    #[must_use]
    pub fn with_label_ids(mut self, label_ids: Vec<String>) -> Self {
        self.label_ids = label_ids;
        self
    }

    /// Drops mail from these senders.
    #[must_use]
    pub fn with_blocked_senders(mut self, senders: &[String]) -> Self {
        self.reconciler = self.reconciler.with_blocked_senders(senders);
        self
    }

    /// Requires `Authorization: Bearer <secret>` on the cron endpoint.
    #[must_use]
    pub fn with_cron_secret(mut self, secret: Option<String>) -> Self {
        self.cron = CronAuth { secret };
        self
    }

    /// Opens the database and builds every collaborator from `settings`.
    ///
    /// Without Gmail credentials the service runs on the demo mailbox.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or a client cannot
    /// be constructed.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let db_path = settings.database_path();
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let db = db_path.to_string_lossy();
        let store = Arc::new(CacheStore::new(&db).await?);
        let requirements = RequirementRepository::new(&db).await?;
        info!(path = %db_path.display(), "database opened");

        let mailbox: Arc<dyn Mailbox> = if settings.gmail.is_configured() {
            Arc::new(GmailClient::new(settings.gmail.credentials())?)
        } else {
            warn!("Gmail credentials not configured, serving the demo mailbox");
            Arc::new(DemoMailbox)
        };

        let classifier = ClassifierClient::new(settings.classifier_config())?;
        if !classifier.is_configured() {
            warn!("classifier API key not set, every message gets the default score");
        }

        let jira_config = settings.jira_config();
        let missing = jira_config.missing_fields();
        if !missing.is_empty() {
            warn!(?missing, "Jira not configured, tracker endpoints will answer 503");
        }
        let tracker: Arc<dyn Tracker> = Arc::new(JiraClient::new(jira_config)?);

        let drafting = DraftingClient::new(settings.drafting_config())?;
        if !drafting.is_configured() {
            warn!("drafting API key not set, AI endpoints will answer 503");
        }

        Ok(Self::new(
            store,
            requirements,
            Collaborators {
                mailbox,
                classifier: Arc::new(classifier),
                tracker,
                drafting,
            },
        )
        .with_label_ids(settings.gmail.label_ids.clone())
        .with_blocked_senders(&settings.blocked_senders)
        .with_cron_secret(settings.cron_secret.clone()))
    }
}
