//! boardsync service binary.
//!
//! Standalone HTTP service that receives tracker webhooks and reconciles
//! labels and project-board placement against description directives.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use boardsync::{server, Config, GitHubClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("boardsync=info".parse()?))
        .init();

    info!("Starting boardsync service...");

    // Load configuration
    let config = Config::default();

    if config.github_token.is_none() {
        warn!("No GITHUB_TOKEN configured - tracker API calls will fail");
    }
    if config.webhook_secret.is_none() {
        warn!("No GITHUB_WEBHOOK_SECRET configured - signature verification disabled");
    }
    if config.allowed_repos.is_empty() {
        info!("No BOARDSYNC_REPOS configured - accepting events from all repositories");
    } else {
        info!(repos = ?config.allowed_repos, "Repository allow-list active");
    }

    let token = config.github_token.clone().unwrap_or_default();
    let github = GitHubClient::with_base_url(&token, &config.github_api_url)
        .context("Failed to create GitHub client")?;

    // Build application state and router
    let state = server::AppState {
        config: config.clone(),
        github,
    };
    let app = server::build_router(state);

    // Bind and serve
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(port = config.port, "boardsync service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutdown signal received");
        })
        .await
        .context("Server error")?;

    Ok(())
}
