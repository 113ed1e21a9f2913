//! Configuration for the boardsync service.

use std::env;

/// Webhook service configuration.
///
/// Loaded from the environment once at startup and passed into the router
/// state; reconcilers never read the environment themselves.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// Webhook signing secret for signature verification.
    pub webhook_secret: Option<String>,
    /// GitHub token for API calls.
    pub github_token: Option<String>,
    /// Base URL for the GitHub API (overridable for tests/proxies).
    pub github_api_url: String,
    /// Repositories to act on, as "owner/repo". Empty means all.
    pub allowed_repos: Vec<String>,
    /// Whether an absent `**Labels**:` directive strips all existing labels.
    ///
    /// The historical behavior is to strip; disabling this leaves labels
    /// untouched when the directive is missing entirely. An explicit empty
    /// directive (`[]`) always means "strip".
    pub strip_labels_on_missing_directive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("BOARDSYNC_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            webhook_secret: env::var("GITHUB_WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.is_empty()),
            github_token: env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty()),
            github_api_url: env::var("GITHUB_API_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "https://api.github.com".to_string()),
            allowed_repos: env::var("BOARDSYNC_REPOS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|r| r.trim().to_string())
                        .filter(|r| !r.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            strip_labels_on_missing_directive: env::var("BOARDSYNC_STRIP_LABELS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        }
    }
}

impl Config {
    /// Check whether events from `owner/repo` should be processed.
    ///
    /// An empty allow-list accepts every repository.
    #[must_use]
    pub fn is_repo_allowed(&self, full_name: &str) -> bool {
        self.allowed_repos.is_empty() || self.allowed_repos.iter().any(|r| r == full_name)
    }
}
