//! `inboxflow` - support inbox triage service
//!
//! Serves a JSON API that fetches mail, scores it with an LLM, drafts replies
//! and tickets, and keeps Jira ticket links in sync with the tracker.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod auth;
mod config;
mod credentials;
mod error;
mod handlers;
mod server;
mod state;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Settings;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inboxflow=debug,inboxflow_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting inboxflow");

    let settings = Settings::load().await?;
    info!(?settings, "settings resolved");

    let state = AppState::from_settings(&settings).await?;
    server::serve(&settings.bind, state).await
}
