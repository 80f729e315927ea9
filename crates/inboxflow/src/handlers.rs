//! HTTP request handlers for the JSON API.

use std::collections::HashSet;
use std::time::Duration;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use inboxflow_core::{
    Action, CacheSnapshot, CreatedIssue, Email, EmailStatus, Error, IssueType, Label, Language,
    NewIssue, NewRequirement, Priority, RefreshRequest, ReplyDraft, ReplyRequest,
    RequirementTicket, StatusEntry, TicketDraft, TicketRequest, Tone, TrackedRequirement,
    detect_language, requirement,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::ApiResult;
use crate::state::AppState;

/// Messages per refresh when the caller does not say.
pub const DEFAULT_MAX_RESULTS: u32 = 20;

/// Messages per scheduled refresh.
pub const CRON_MAX_RESULTS: u32 = 30;

/// How long a refresh response waits for ticket verification.
const VERIFY_WAIT: Duration = Duration::from_secs(2);

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Query of GET /api/emails.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailsQuery {
    /// Requested count, clamped to `1..=50`.
    pub max_results: Option<u32>,
    /// Comma-separated ids the caller already holds.
    pub known_ids: Option<String>,
}

/// Response of GET /api/emails.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailsResponse {
    /// Visible merged messages.
    pub emails: Vec<Email>,
    /// Start of the refresh cycle.
    pub fetched_at: DateTime<Utc>,
}

async fn run_refresh(
    state: &AppState,
    max_results: u32,
    known_ids: HashSet<String>,
) -> ApiResult<EmailsResponse> {
    let outcome = state
        .reconciler
        .refresh(RefreshRequest {
            label_ids: state.label_ids.clone(),
            max_results,
            known_ids,
        })
        .await?;

    // Reverted tickets show up in this response when verification is quick;
    // otherwise the task keeps running detached and the next refresh sees them.
    if let Some(mut handle) = outcome.verification {
        match tokio::time::timeout(VERIFY_WAIT, &mut handle).await {
            Ok(Ok(report)) => {
                debug!(
                    checked = report.checked,
                    reverted = report.reverted.len(),
                    "ticket verification finished"
                );
            }
            Ok(Err(e)) => warn!(error = %e, "ticket verification task failed"),
            Err(_) => debug!("ticket verification still running, responding without it"),
        }
    }

    Ok(EmailsResponse {
        emails: outcome.inbox.snapshot().await,
        fetched_at: outcome.fetched_at,
    })
}

/// GET /api/emails
///
/// Runs one refresh cycle.
pub async fn list_emails(
    State(state): State<AppState>,
    Query(query): Query<EmailsQuery>,
) -> ApiResult<Json<EmailsResponse>> {
    let known_ids: HashSet<String> = query
        .known_ids
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();

    let response = run_refresh(
        &state,
        query.max_results.unwrap_or(DEFAULT_MAX_RESULTS),
        known_ids,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/cron/fetch-emails
///
/// Scheduled refresh; authentication happens in middleware.
pub async fn cron_fetch_emails(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let response = run_refresh(&state, CRON_MAX_RESULTS, HashSet::new()).await?;
    info!(count = response.emails.len(), "scheduled fetch complete");
    Ok(Json(json!({
        "ok": true,
        "count": response.emails.len(),
        "fetchedAt": response.fetched_at,
    })))
}

/// GET /api/cache
pub async fn get_cache(State(state): State<AppState>) -> Json<CacheSnapshot> {
    Json(state.store.load_all().await)
}

/// Body of PATCH /api/cache.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStatusRequest {
    /// Messages to update.
    pub email_ids: Vec<String>,
    /// New status.
    pub status: EmailStatus,
    /// Also remove linked ticket keys.
    #[serde(default)]
    pub clear_ticket_key: bool,
}

/// PATCH /api/cache
///
/// Sets one status on many messages.
pub async fn patch_cache(
    State(state): State<AppState>,
    Json(body): Json<BatchStatusRequest>,
) -> ApiResult<Json<Value>> {
    state
        .store
        .batch_set_status(&body.email_ids, body.status, body.clear_ticket_key)
        .await?;
    debug!(count = body.email_ids.len(), status = %body.status, "batch status set");
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/emails/{id}/actions
pub async fn apply_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<Action>,
) -> ApiResult<Json<StatusEntry>> {
    Ok(Json(state.workflow.apply(&id, &action).await?))
}

/// POST /api/emails/{id}/ticket
///
/// Creates a tracker issue and links it to the message.
pub async fn create_email_ticket(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(issue): Json<NewIssue>,
) -> ApiResult<Json<CreatedIssue>> {
    Ok(Json(state.workflow.create_ticket_for(&id, &issue).await?))
}

/// Body of POST /api/ai/reply.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBody {
    /// Sender display name.
    #[serde(default)]
    pub from_name: String,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Original body.
    #[serde(default)]
    pub body: String,
    /// Desired tone.
    #[serde(default)]
    pub tone: Tone,
    /// Message language; detected from the body when absent.
    #[serde(default)]
    pub language: Option<Language>,
}

/// POST /api/ai/reply
pub async fn ai_reply(
    State(state): State<AppState>,
    Json(body): Json<ReplyBody>,
) -> ApiResult<Json<ReplyDraft>> {
    if body.body.trim().is_empty() {
        return Err(Error::Validation("body is required".into()).into());
    }
    let language = body.language.unwrap_or_else(|| detect_language(&body.body));
    let draft = state
        .drafting
        .generate_reply(&ReplyRequest {
            from_name: body.from_name,
            subject: body.subject,
            body: body.body,
            tone: body.tone,
            language,
        })
        .await
        .map_err(Error::from)?;
    Ok(Json(draft))
}

/// Body of POST /api/ai/translate.
#[derive(Debug, Deserialize)]
pub struct TranslateBody {
    /// Text to translate.
    #[serde(default)]
    pub body: String,
}

/// POST /api/ai/translate
pub async fn ai_translate(
    State(state): State<AppState>,
    Json(body): Json<TranslateBody>,
) -> ApiResult<Json<Value>> {
    let translation = state
        .drafting
        .translate(&body.body)
        .await
        .map_err(Error::from)?;
    Ok(Json(json!({ "translation": translation })))
}

/// Body of POST /api/ai/jira.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketBody {
    /// Sender display name.
    #[serde(default)]
    pub from_name: String,
    /// Sender address.
    #[serde(default)]
    pub from_email: String,
    /// Subject line.
    #[serde(default)]
    pub subject: String,
    /// Original body.
    #[serde(default)]
    pub body: String,
    /// Body already translated into the pivot language.
    #[serde(default)]
    pub translated_body: Option<String>,
}

/// POST /api/ai/jira
///
/// Drafts a ticket title and description from a message.
pub async fn ai_ticket(
    State(state): State<AppState>,
    Json(body): Json<TicketBody>,
) -> ApiResult<Json<TicketDraft>> {
    let draft = state
        .drafting
        .draft_ticket(&TicketRequest {
            from_name: body.from_name,
            from_email: body.from_email,
            subject: body.subject,
            body: body.body,
            translated_body: body.translated_body.filter(|t| !t.trim().is_empty()),
        })
        .await
        .map_err(Error::from)?;
    Ok(Json(draft))
}

/// Body of POST /api/ai/analyze-requirement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeBody {
    /// Free-form requirement.
    #[serde(default)]
    pub text: String,
    /// Earlier draft to refine.
    #[serde(default)]
    pub previous_result: Option<TicketDraft>,
    /// What to change about the earlier draft.
    #[serde(default)]
    pub feedback: Option<String>,
}

/// POST /api/ai/analyze-requirement
pub async fn ai_analyze_requirement(
    State(state): State<AppState>,
    Json(body): Json<AnalyzeBody>,
) -> ApiResult<Json<TicketDraft>> {
    let draft = state
        .drafting
        .analyze_requirement(
            &body.text,
            body.previous_result.as_ref(),
            body.feedback.as_deref(),
        )
        .await
        .map_err(Error::from)?;
    Ok(Json(draft))
}

/// Response of GET /api/jira/projects.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    /// Project new issues go to.
    pub project_key: String,
    /// Non-subtask issue types.
    pub issue_types: Vec<IssueType>,
    /// Priorities.
    pub priorities: Vec<Priority>,
}

fn require_tracker(state: &AppState) -> ApiResult<()> {
    if state.tracker.is_configured() {
        Ok(())
    } else {
        Err(Error::Config(
            "Jira is not configured: set JIRA_BASE_URL, JIRA_EMAIL, JIRA_API_TOKEN and JIRA_PROJECT_KEY"
                .into(),
        )
        .into())
    }
}

/// GET /api/jira/projects
pub async fn jira_projects(State(state): State<AppState>) -> ApiResult<Json<ProjectInfo>> {
    require_tracker(&state)?;
    let (issue_types, priorities) = tokio::try_join!(
        state.tracker.list_issue_types(),
        state.tracker.list_priorities()
    )?;
    Ok(Json(ProjectInfo {
        project_key: state.tracker.project_key().to_string(),
        issue_types,
        priorities,
    }))
}

/// POST /api/jira/create
pub async fn jira_create(
    State(state): State<AppState>,
    Json(issue): Json<NewIssue>,
) -> ApiResult<Json<CreatedIssue>> {
    require_tracker(&state)?;
    let created = state.tracker.create_issue(&issue).await?;
    info!(key = %created.key, "issue created");
    Ok(Json(created))
}

/// Body of POST /api/jira/verify.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyBody {
    /// Keys to check.
    #[serde(default)]
    pub keys: Vec<String>,
}

/// POST /api/jira/verify
pub async fn jira_verify(
    State(state): State<AppState>,
    Json(body): Json<VerifyBody>,
) -> ApiResult<Json<Value>> {
    require_tracker(&state)?;
    let existing: Vec<String> = if body.keys.is_empty() {
        Vec::new()
    } else {
        state.tracker.verify_keys_exist(&body.keys).await?
    };
    Ok(Json(json!({ "existingKeys": existing })))
}

/// GET /api/jira/issues
///
/// Linked requirement tickets with their upstream progress.
pub async fn jira_issues(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TrackedRequirement>>> {
    let rows = requirement::overview(&state.requirements, state.tracker.as_ref()).await?;
    Ok(Json(rows))
}

/// GET /api/requirement-tickets
pub async fn list_requirements(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RequirementTicket>>> {
    Ok(Json(state.requirements.list().await?))
}

/// POST /api/requirement-tickets
pub async fn create_requirement(
    State(state): State<AppState>,
    Json(body): Json<NewRequirement>,
) -> ApiResult<Json<RequirementTicket>> {
    Ok(Json(state.requirements.create(&body).await?))
}

/// Body of PATCH /api/requirement-tickets/{id}.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBody {
    /// Tracker key.
    pub ticket_key: String,
    /// Tracker browse URL.
    #[serde(default)]
    pub ticket_url: Option<String>,
}

/// PATCH /api/requirement-tickets/{id}
///
/// Links a draft requirement to an existing issue.
pub async fn link_requirement(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<LinkBody>,
) -> ApiResult<Json<RequirementTicket>> {
    state
        .requirements
        .link(id, &body.ticket_key, body.ticket_url.as_deref())
        .await?;
    let ticket = state
        .requirements
        .get(id)
        .await?
        .ok_or_else(|| Error::Validation(format!("requirement ticket {id} not found")))?;
    Ok(Json(ticket))
}

/// GET /api/gmail/labels
pub async fn gmail_labels(State(state): State<AppState>) -> ApiResult<Json<Vec<Label>>> {
    Ok(Json(state.reconciler.mailbox().list_labels().await?))
}
