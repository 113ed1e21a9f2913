//! Label and project-board reconciliation.
//!
//! Reconciliation computes the minimal set of tracker calls needed to make
//! observed state match the desired state declared in the description
//! directives, then applies them best-effort: independent calls are all
//! attempted, failures are collected and surfaced as one aggregated error.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::github_client::GitHubClient;
use crate::models::IssueRef;

/// The only column this service ever targets for automatic card creation.
pub const INTAKE_COLUMN: &str = "Backlog";

/// Aggregated result of a best-effort reconciliation pass.
///
/// Partial completion is an error to the caller, not a silent success: the
/// webhook source re-delivers on a non-2xx response and label reconciliation
/// converges on re-runs.
#[derive(Debug, Error)]
#[error("{failed} of {attempted} tracker calls failed: {}", .details.join("; "))]
pub struct PartialFailure {
    /// Number of tracker calls attempted.
    pub attempted: usize,
    /// Number that failed.
    pub failed: usize,
    /// One message per failed call.
    pub details: Vec<String>,
}

/// Minimal label change set.
///
/// `to_add` and `to_remove` are disjoint by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDelta {
    /// Labels to add, in desired-set order.
    pub to_add: Vec<String>,
    /// Labels to remove, in existing-set order.
    pub to_remove: Vec<String>,
}

impl LabelDelta {
    /// Whether there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// First-occurrence deduplication, preserving order.
fn dedup(values: &[String]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(&value.as_str()) {
            seen.push(value);
        }
    }
    seen
}

/// Compute the minimal label change set as a pure set difference.
///
/// `to_add = desired − existing`, `to_remove = existing − desired`. An empty
/// desired set therefore means "remove every existing label".
#[must_use]
pub fn label_delta(desired: &[String], existing: &[String]) -> LabelDelta {
    let desired_set = dedup(desired);
    let existing_set = dedup(existing);

    LabelDelta {
        to_add: desired_set
            .iter()
            .filter(|name| !existing_set.contains(name))
            .map(|name| (*name).to_string())
            .collect(),
        to_remove: existing_set
            .iter()
            .filter(|name| !desired_set.contains(name))
            .map(|name| (*name).to_string())
            .collect(),
    }
}

/// Reconcile the item's labels against the desired set.
///
/// Issues one batched add call for everything missing and one remove call per
/// surplus label. All calls are attempted even if earlier ones fail; failures
/// come back as a single [`PartialFailure`].
pub async fn reconcile_labels(
    client: &GitHubClient,
    issue: &IssueRef,
    desired: &[String],
) -> Result<(), PartialFailure> {
    let delta = label_delta(desired, &issue.label_names);

    if delta.is_empty() {
        debug!(
            owner = %issue.owner,
            repo = %issue.repo,
            number = issue.number,
            "Labels already converged"
        );
        return Ok(());
    }

    info!(
        owner = %issue.owner,
        repo = %issue.repo,
        number = issue.number,
        to_add = ?delta.to_add,
        to_remove = ?delta.to_remove,
        "Reconciling labels"
    );

    let mut attempted = 0;
    let mut details = Vec::new();

    if !delta.to_add.is_empty() {
        attempted += 1;
        if let Err(e) = client
            .add_labels(&issue.owner, &issue.repo, issue.number, &delta.to_add)
            .await
        {
            warn!(
                number = issue.number,
                error = %e,
                "Failed to add labels"
            );
            details.push(format!("add {:?}: {e}", delta.to_add));
        }
    }

    for label in &delta.to_remove {
        attempted += 1;
        if let Err(e) = client
            .remove_label(&issue.owner, &issue.repo, issue.number, label)
            .await
        {
            warn!(
                number = issue.number,
                label = %label,
                error = %e,
                "Failed to remove label"
            );
            details.push(format!("remove {label}: {e}"));
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(PartialFailure {
            attempted,
            failed: details.len(),
            details,
        })
    }
}

/// Ensure the item has a card in the intake column of every named board.
///
/// Boards are listed once up front; a board or column observed to exist is
/// never re-created within the same call. Each missing piece is created in a
/// sequential board → column → card chain, threading the id from each step
/// into the next and stopping that board's chain on first failure. Placement
/// is append-only: boards no longer named are left untouched.
pub async fn place_on_boards(
    client: &GitHubClient,
    issue: &IssueRef,
    desired_names: &[String],
) -> Result<(), PartialFailure> {
    if desired_names.is_empty() {
        return Ok(());
    }

    let boards = match client.list_boards(&issue.owner, &issue.repo).await {
        Ok(boards) => boards,
        Err(e) => {
            warn!(
                owner = %issue.owner,
                repo = %issue.repo,
                error = %e,
                "Failed to list boards"
            );
            return Err(PartialFailure {
                attempted: 1,
                failed: 1,
                details: vec![format!("list boards: {e}")],
            });
        }
    };

    let mut attempted = 0;
    let mut details = Vec::new();

    for name in dedup(desired_names) {
        attempted += 1;
        let result = match boards.iter().find(|b| b.name == name) {
            Some(board) => place_on_existing_board(client, issue, board.id, name).await,
            None => place_on_new_board(client, issue, name).await,
        };

        if let Err(e) = result {
            warn!(
                owner = %issue.owner,
                repo = %issue.repo,
                number = issue.number,
                board = %name,
                error = %e,
                "Failed to place card on board"
            );
            details.push(format!("board {name}: {e:#}"));
        }
    }

    if details.is_empty() {
        Ok(())
    } else {
        Err(PartialFailure {
            attempted,
            failed: details.len(),
            details,
        })
    }
}

/// Find or create the intake column on an existing board, then add the card.
async fn place_on_existing_board(
    client: &GitHubClient,
    issue: &IssueRef,
    board_id: u64,
    board_name: &str,
) -> anyhow::Result<()> {
    let columns = client.list_columns(board_id).await?;

    let column_id = match columns.iter().find(|c| c.name == INTAKE_COLUMN) {
        Some(column) => column.id,
        None => {
            info!(
                board = %board_name,
                column = INTAKE_COLUMN,
                "Creating intake column"
            );
            client.create_column(board_id, INTAKE_COLUMN).await?.id
        }
    };

    let card = client
        .create_card(column_id, issue.content_id, issue.content_type)
        .await?;

    info!(
        board = %board_name,
        column_id = column_id,
        card_id = card.id,
        number = issue.number,
        "Placed card on existing board"
    );
    Ok(())
}

/// Create a board, its intake column, and the card, in order.
async fn place_on_new_board(
    client: &GitHubClient,
    issue: &IssueRef,
    board_name: &str,
) -> anyhow::Result<()> {
    info!(
        owner = %issue.owner,
        repo = %issue.repo,
        board = %board_name,
        "Creating board"
    );

    let board = client
        .create_board(&issue.owner, &issue.repo, board_name)
        .await?;
    let column = client.create_column(board.id, INTAKE_COLUMN).await?;
    let card = client
        .create_card(column.id, issue.content_id, issue.content_type)
        .await?;

    info!(
        board = %board_name,
        board_id = board.id,
        column_id = column.id,
        card_id = card.id,
        number = issue.number,
        "Placed card on new board"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_label_delta_basic() {
        let delta = label_delta(&strings(&["b", "c"]), &strings(&["a", "b"]));
        assert_eq!(delta.to_add, vec!["c"]);
        assert_eq!(delta.to_remove, vec!["a"]);
    }

    #[test]
    fn test_label_delta_converges_on_rerun() {
        // After applying {+c, -a}, existing is {b, c}; a re-run is a no-op.
        let delta = label_delta(&strings(&["b", "c"]), &strings(&["b", "c"]));
        assert!(delta.is_empty());
    }

    #[test]
    fn test_label_delta_empty_desired_strips_all() {
        let delta = label_delta(&[], &strings(&["a", "b"]));
        assert!(delta.to_add.is_empty());
        assert_eq!(delta.to_remove, vec!["a", "b"]);
    }

    #[test]
    fn test_label_delta_sets_are_disjoint() {
        let delta = label_delta(&strings(&["a", "b"]), &strings(&["b", "c"]));
        for added in &delta.to_add {
            assert!(!delta.to_remove.contains(added));
        }
    }

    #[test]
    fn test_label_delta_collapses_duplicates() {
        let delta = label_delta(&strings(&["a", "a", "b"]), &[]);
        assert_eq!(delta.to_add, vec!["a", "b"]);
    }

    #[test]
    fn test_label_delta_preserves_source_order() {
        let delta = label_delta(&strings(&["z", "a", "m"]), &strings(&["q", "b"]));
        assert_eq!(delta.to_add, vec!["z", "a", "m"]);
        assert_eq!(delta.to_remove, vec!["q", "b"]);
    }

    #[test]
    fn test_partial_failure_display() {
        let failure = PartialFailure {
            attempted: 3,
            failed: 2,
            details: vec!["remove p1: 502".to_string(), "board Triage: 502".to_string()],
        };
        let message = failure.to_string();
        assert!(message.contains("2 of 3"));
        assert!(message.contains("remove p1"));
        assert!(message.contains("board Triage"));
    }
}
