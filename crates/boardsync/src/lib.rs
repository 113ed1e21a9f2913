//! Webhook service that reconciles tracker state with issue-body directives.
//!
//! This crate provides:
//! - Directive extraction from issue/PR descriptions (`**Labels**: [..]` lines)
//! - Label reconciliation (minimal add/remove delta against current labels)
//! - Project-board placement (find-or-create board, intake column, card)
//! - Webhook payload parsing and signature verification
//! - HTTP server for webhook handling (standalone service)

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Many async API methods can fail

pub mod config;
pub mod directives;
pub mod github_client;
pub mod models;
pub mod reconcile;
pub mod server;
pub mod webhooks;

pub use config::Config;
pub use github_client::GitHubClient;
pub use models::{IssueAction, IssueRef, IssuesEvent, PullRequestEvent};
pub use reconcile::{label_delta, place_on_boards, reconcile_labels, PartialFailure};
pub use webhooks::{verify_webhook_signature, WebhookHeaders};
