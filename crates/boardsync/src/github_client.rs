//! GitHub API client for label and project-board operations.

use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::models::ContentType;

const GITHUB_API_URL: &str = "https://api.github.com";

/// Media type required by the classic projects endpoints.
const PROJECTS_ACCEPT: &str = "application/vnd.github.inertia-preview+json";

/// GitHub API client for the tracker operations this service performs.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

/// A project board.
#[derive(Debug, Clone, Deserialize)]
pub struct Board {
    pub id: u64,
    pub name: String,
}

/// A column on a project board.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardColumn {
    pub id: u64,
    pub name: String,
}

/// A card placed in a board column.
#[derive(Debug, Clone, Deserialize)]
pub struct Card {
    pub id: u64,
}

/// Request to create a card referencing an issue or pull request.
#[derive(Debug, Serialize)]
struct CreateCardRequest {
    content_id: u64,
    content_type: ContentType,
}

impl GitHubClient {
    /// Create a new GitHub client against the public API.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, GITHUB_API_URL)
    }

    /// Create a client against a custom API base URL (tests, proxies).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("boardsync/1.0"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            token: token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Add labels to an issue or pull request as one batched call.
    pub async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        labels: &[String],
    ) -> Result<()> {
        let url = format!(
            "{}/repos/{owner}/{repo}/issues/{number}/labels",
            self.base_url
        );

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&json!({ "labels": labels }))
            .send()
            .await
            .context("Failed to send add labels request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GitHub API error adding labels: {status} - {body}"));
        }

        Ok(())
    }

    /// Remove a single label from an issue or pull request.
    pub async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<()> {
        // Label names may contain spaces, so build the path with proper
        // percent-encoding instead of format!.
        let number = number.to_string();
        let mut url =
            reqwest::Url::parse(&self.base_url).context("Invalid GitHub API base URL")?;
        url.path_segments_mut()
            .map_err(|()| anyhow!("GitHub API base URL cannot be a base"))?
            .extend(["repos", owner, repo, "issues", &number, "labels", label]);

        let response = self
            .client
            .delete(url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .context("Failed to send remove label request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "GitHub API error removing label {label}: {status} - {body}"
            ));
        }

        Ok(())
    }

    /// List project boards for a repository.
    pub async fn list_boards(&self, owner: &str, repo: &str) -> Result<Vec<Board>> {
        let url = format!("{}/repos/{owner}/{repo}/projects", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, PROJECTS_ACCEPT)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .context("Failed to send list boards request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GitHub API error listing boards: {status} - {body}"));
        }

        response
            .json()
            .await
            .context("Failed to parse board list response")
    }

    /// Create a project board in a repository.
    pub async fn create_board(&self, owner: &str, repo: &str, name: &str) -> Result<Board> {
        let url = format!("{}/repos/{owner}/{repo}/projects", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, PROJECTS_ACCEPT)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&json!({ "name": name }))
            .send()
            .await
            .context("Failed to send create board request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "GitHub API error creating board {name}: {status} - {body}"
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse create board response")
    }

    /// List columns on a project board.
    pub async fn list_columns(&self, board_id: u64) -> Result<Vec<BoardColumn>> {
        let url = format!("{}/projects/{board_id}/columns", self.base_url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, PROJECTS_ACCEPT)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await
            .context("Failed to send list columns request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "GitHub API error listing columns: {status} - {body}"
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse column list response")
    }

    /// Create a column on a project board.
    pub async fn create_column(&self, board_id: u64, name: &str) -> Result<BoardColumn> {
        let url = format!("{}/projects/{board_id}/columns", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, PROJECTS_ACCEPT)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&json!({ "name": name }))
            .send()
            .await
            .context("Failed to send create column request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "GitHub API error creating column {name}: {status} - {body}"
            ));
        }

        response
            .json()
            .await
            .context("Failed to parse create column response")
    }

    /// Create a card in a column referencing an issue or pull request.
    pub async fn create_card(
        &self,
        column_id: u64,
        content_id: u64,
        content_type: ContentType,
    ) -> Result<Card> {
        let url = format!("{}/projects/columns/{column_id}/cards", self.base_url);

        let request = CreateCardRequest {
            content_id,
            content_type,
        };

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, PROJECTS_ACCEPT)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(&request)
            .send()
            .await
            .context("Failed to send create card request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("GitHub API error creating card: {status} - {body}"));
        }

        response
            .json()
            .await
            .context("Failed to parse create card response")
    }
}
