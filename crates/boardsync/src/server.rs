//! HTTP server and event routing for tracker webhooks.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::directives::{self, LABELS_MARKER, PROJECTS_MARKER, VALUE_DELIMITER};
use crate::github_client::GitHubClient;
use crate::models::{IssueAction, IssueRef, IssuesEvent, PullRequestEvent};
use crate::reconcile;
use crate::webhooks::{verify_webhook_signature, WebhookHeaders};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration.
    pub config: Config,
    /// GitHub API client.
    pub github: GitHubClient,
}

/// Build the HTTP router for the boardsync service.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhooks/github", post(github_webhook_handler))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Readiness check endpoint.
async fn readiness_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    if state.config.github_token.is_none() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({ "status": "ready" })))
}

/// Handle incoming GitHub webhooks.
///
/// This handler:
/// 1. Verifies webhook signature (if secret configured)
/// 2. Dispatches by event type (`issues` / `pull_request`)
/// 3. Routes to the reconcilers by action
pub async fn github_webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, StatusCode> {
    let parsed = WebhookHeaders::from_header_map(|name| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    });

    let delivery_id = parsed.delivery_id.as_deref().unwrap_or("unknown");
    let event_type = parsed.event_type.as_deref().unwrap_or("unknown");

    info!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received GitHub webhook"
    );

    // Verify signature if secret is configured
    if let Some(secret) = &state.config.webhook_secret {
        let Some(sig) = &parsed.signature else {
            warn!("Missing X-Hub-Signature-256 header");
            return Err(StatusCode::UNAUTHORIZED);
        };

        if !verify_webhook_signature(&body, sig, secret) {
            warn!("Invalid webhook signature");
            return Err(StatusCode::UNAUTHORIZED);
        }
        debug!("Webhook signature verified");
    }

    match event_type {
        "issues" => {
            let event: IssuesEvent = serde_json::from_slice(&body).map_err(|e| {
                error!(error = %e, "Failed to parse issues payload");
                StatusCode::BAD_REQUEST
            })?;

            let issue = IssueRef::from_issue(&event);
            let prior_body = event
                .changes
                .as_ref()
                .and_then(|c| c.body.as_ref())
                .map(|b| b.from.clone());

            process_event(
                &state,
                &event.repository.full_name(),
                issue,
                event.action,
                event.issue.body.as_deref().unwrap_or(""),
                prior_body.as_deref(),
            )
            .await
        }
        "pull_request" => {
            let event: PullRequestEvent = serde_json::from_slice(&body).map_err(|e| {
                error!(error = %e, "Failed to parse pull_request payload");
                StatusCode::BAD_REQUEST
            })?;

            let issue = IssueRef::from_pull_request(&event);
            let prior_body = event
                .changes
                .as_ref()
                .and_then(|c| c.body.as_ref())
                .map(|b| b.from.clone());

            process_event(
                &state,
                &event.repository.full_name(),
                issue,
                event.action,
                event.pull_request.body.as_deref().unwrap_or(""),
                prior_body.as_deref(),
            )
            .await
        }
        _ => {
            debug!(event_type = %event_type, "Ignoring unhandled event type");
            Ok(Json(json!({
                "status": "ignored",
                "reason": "unhandled_event_type"
            })))
        }
    }
}

/// Route one issue or pull-request event to the reconcilers.
///
/// Label reconciliation runs against the full current desired set on every
/// action except `labeled` (which our own add calls trigger). Placement runs
/// on `opened` with the full set and on `edited` narrowed to newly added
/// names, so already-placed projects are not re-placed.
async fn process_event(
    state: &AppState,
    full_name: &str,
    issue: IssueRef,
    action: IssueAction,
    body: &str,
    prior_body: Option<&str>,
) -> Result<Json<Value>, StatusCode> {
    if !state.config.is_repo_allowed(full_name) {
        debug!(repository = %full_name, "Repository not on allow-list");
        return Ok(Json(json!({
            "status": "ignored",
            "reason": "repository_not_allowed",
            "repository": full_name
        })));
    }

    if action == IssueAction::Labeled {
        debug!(
            repository = %full_name,
            number = issue.number,
            "Ignoring labeled action"
        );
        return Ok(Json(json!({
            "status": "ignored",
            "reason": "self_triggered_label_event"
        })));
    }

    let desired_labels = directives::extract(body, LABELS_MARKER, VALUE_DELIMITER);

    // An absent directive strips all labels under the default policy; a
    // present-but-empty (or malformed) directive always means "no labels".
    let run_labels =
        body.contains(LABELS_MARKER) || state.config.strip_labels_on_missing_directive;

    let desired_projects = match action {
        IssueAction::Opened => directives::extract(body, PROJECTS_MARKER, VALUE_DELIMITER),
        // A missing body diff means the description did not change (e.g. a
        // title edit), so nothing is newly added.
        IssueAction::Edited => {
            directives::added_values(body, prior_body.unwrap_or(body), PROJECTS_MARKER)
        }
        _ => Vec::new(),
    };

    info!(
        repository = %full_name,
        number = issue.number,
        action = ?action,
        desired_labels = ?desired_labels,
        desired_projects = ?desired_projects,
        "Processing event"
    );

    // Label and placement reconciliation are independent; run them
    // concurrently.
    let labels_task = async {
        if run_labels {
            reconcile::reconcile_labels(&state.github, &issue, &desired_labels).await
        } else {
            Ok(())
        }
    };
    let placement_task = reconcile::place_on_boards(&state.github, &issue, &desired_projects);

    let (labels_result, placement_result) = tokio::join!(labels_task, placement_task);

    let mut failures = Vec::new();
    if let Err(e) = labels_result {
        error!(
            repository = %full_name,
            number = issue.number,
            error = %e,
            "Label reconciliation incomplete"
        );
        failures.push(format!("labels: {e}"));
    }
    if let Err(e) = placement_result {
        error!(
            repository = %full_name,
            number = issue.number,
            error = %e,
            "Board placement incomplete"
        );
        failures.push(format!("placement: {e}"));
    }

    // Non-2xx makes the webhook source re-deliver; label reconciliation
    // converges on re-runs and placement is best-effort.
    if !failures.is_empty() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    Ok(Json(json!({
        "status": "accepted",
        "repository": full_name,
        "number": issue.number,
        "labels_reconciled": run_labels,
        "projects_placed": desired_projects
    })))
}
