//! Inbound webhook payload types and the reconciler-facing issue reference.

use serde::{Deserialize, Serialize};

/// Action tag on an issue or pull-request event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueAction {
    /// Item was just created.
    Opened,
    /// Description (or other fields) changed; `changes.body.from` carries
    /// the prior description.
    Edited,
    /// A label was added. Skipped by label reconciliation to avoid
    /// re-processing events triggered by our own label-add calls.
    Labeled,
    /// Any other action (catch-all to avoid parse failures).
    #[serde(other)]
    Other,
}

/// `issues` webhook event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct IssuesEvent {
    /// Action type
    pub action: IssueAction,
    /// The issue the event concerns
    pub issue: IssueTarget,
    /// Repository info
    pub repository: Repository,
    /// Field-level diffs, present on `edited` events
    #[serde(default)]
    pub changes: Option<Changes>,
}

/// `pull_request` webhook event payload.
#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestEvent {
    /// Action type
    pub action: IssueAction,
    /// The pull request the event concerns
    pub pull_request: IssueTarget,
    /// Repository info
    pub repository: Repository,
    /// Field-level diffs, present on `edited` events
    #[serde(default)]
    pub changes: Option<Changes>,
}

/// The tracked item carried in either event kind.
///
/// Issues and pull requests share every field this service cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueTarget {
    /// Unique id (used as card content id)
    pub id: u64,
    /// Item number within the repository
    pub number: u64,
    /// Description body (markdown)
    #[serde(default)]
    pub body: Option<String>,
    /// Labels currently on the item
    #[serde(default)]
    pub labels: Vec<Label>,
}

/// Label as carried in webhook payloads.
#[derive(Debug, Clone, Deserialize)]
pub struct Label {
    /// Label name
    pub name: String,
}

/// Repository info.
#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// Repository name
    pub name: String,
    /// Owning account
    pub owner: Owner,
}

impl Repository {
    /// "owner/repo" form used by the allow-list.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }
}

/// Repository owner.
#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    /// Account login
    pub login: String,
}

/// Field-level diffs on `edited` events.
#[derive(Debug, Clone, Deserialize)]
pub struct Changes {
    /// Body diff, if the description changed
    #[serde(default)]
    pub body: Option<ChangedField>,
}

/// Prior value of a changed field.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangedField {
    /// Value before the edit
    pub from: String,
}

/// Card content type for board placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    /// Issue content
    Issue,
    /// Pull request content
    PullRequest,
}

/// Identifies a tracked item for reconciliation.
///
/// The single shape both reconcilers consume, built from either event kind.
#[derive(Debug, Clone)]
pub struct IssueRef {
    /// Owning account login
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Item number within the repository
    pub number: u64,
    /// Unique id, used as the card content id
    pub content_id: u64,
    /// Whether this is an issue or a pull request
    pub content_type: ContentType,
    /// Names of labels currently on the item
    pub label_names: Vec<String>,
}

impl IssueRef {
    /// Build a reference from an `issues` event.
    #[must_use]
    pub fn from_issue(event: &IssuesEvent) -> Self {
        Self::build(&event.repository, &event.issue, ContentType::Issue)
    }

    /// Build a reference from a `pull_request` event.
    #[must_use]
    pub fn from_pull_request(event: &PullRequestEvent) -> Self {
        Self::build(
            &event.repository,
            &event.pull_request,
            ContentType::PullRequest,
        )
    }

    fn build(repository: &Repository, target: &IssueTarget, content_type: ContentType) -> Self {
        Self {
            owner: repository.owner.login.clone(),
            repo: repository.name.clone(),
            number: target.number,
            content_id: target.id,
            content_type,
            label_names: target.labels.iter().map(|l| l.name.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_issues_event() {
        let json = r#"{
            "action": "opened",
            "issue": {
                "id": 4242,
                "number": 7,
                "body": "**Labels**: [bug]",
                "labels": [{"name": "triage"}]
            },
            "repository": {
                "name": "tracker",
                "owner": {"login": "acme"}
            }
        }"#;

        let event: IssuesEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.action, IssueAction::Opened);
        assert_eq!(event.repository.full_name(), "acme/tracker");

        let issue = IssueRef::from_issue(&event);
        assert_eq!(issue.number, 7);
        assert_eq!(issue.content_id, 4242);
        assert_eq!(issue.content_type, ContentType::Issue);
        assert_eq!(issue.label_names, vec!["triage"]);
    }

    #[test]
    fn test_parse_edited_event_with_changes() {
        let json = r#"{
            "action": "edited",
            "issue": {"id": 1, "number": 2, "body": "new"},
            "repository": {"name": "tracker", "owner": {"login": "acme"}},
            "changes": {"body": {"from": "old"}}
        }"#;

        let event: IssuesEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.action, IssueAction::Edited);
        let prior = event.changes.and_then(|c| c.body).map(|b| b.from);
        assert_eq!(prior.as_deref(), Some("old"));
    }

    #[test]
    fn test_unknown_action_is_other() {
        let json = r#"{
            "action": "milestoned",
            "issue": {"id": 1, "number": 2},
            "repository": {"name": "tracker", "owner": {"login": "acme"}}
        }"#;

        let event: IssuesEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.action, IssueAction::Other);
    }

    #[test]
    fn test_content_type_serializes_to_tracker_names() {
        assert_eq!(
            serde_json::to_string(&ContentType::Issue).unwrap(),
            "\"Issue\""
        );
        assert_eq!(
            serde_json::to_string(&ContentType::PullRequest).unwrap(),
            "\"PullRequest\""
        );
    }
}
