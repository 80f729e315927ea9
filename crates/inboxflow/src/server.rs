//! HTTP server built on axum.
//!
//! Sets up routes, middleware and shared state for the JSON API.

use axum::Router;
use axum::middleware;
use axum::routing::{get, patch, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::cron_auth_middleware;
use crate::handlers;
use crate::state::AppState;

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    // Only the scheduled trigger is guarded; the UI routes are local.
    let cron_routes = Router::new()
        .route("/api/cron/fetch-emails", get(handlers::cron_fetch_emails))
        .route_layer(middleware::from_fn_with_state(
            state.cron.clone(),
            cron_auth_middleware,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/emails", get(handlers::list_emails))
        .route("/api/emails/{id}/actions", post(handlers::apply_action))
        .route("/api/emails/{id}/ticket", post(handlers::create_email_ticket))
        .route(
            "/api/cache",
            get(handlers::get_cache).patch(handlers::patch_cache),
        )
        .route("/api/ai/reply", post(handlers::ai_reply))
        .route("/api/ai/translate", post(handlers::ai_translate))
        .route("/api/ai/jira", post(handlers::ai_ticket))
        .route(
            "/api/ai/analyze-requirement",
            post(handlers::ai_analyze_requirement),
        )
        .route("/api/jira/projects", get(handlers::jira_projects))
        .route("/api/jira/create", post(handlers::jira_create))
        .route("/api/jira/verify", post(handlers::jira_verify))
        .route("/api/jira/issues", get(handlers::jira_issues))
        .route(
            "/api/requirement-tickets",
            get(handlers::list_requirements).post(handlers::create_requirement),
        )
        .route(
            "/api/requirement-tickets/{id}",
            patch(handlers::link_requirement),
        )
        .route("/api/gmail/labels", get(handlers::gmail_labels))
        .merge(cron_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(addr: &str, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {addr}: {e}"))?;

    info!("inboxflow listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
