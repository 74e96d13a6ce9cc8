use std::sync::Arc;

use axum::serve;
use interfaces_github_repos::index::{GitHubClient, NewGitHubClientError};
use projects_portfolio::{
    config::{Config, ConfigError},
    router,
    state::AppState,
    utils::contact_sink::LogContactSink,
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MainError {
    #[error("Config: {source}")]
    Config {
        #[source]
        source: ConfigError,
    },
    #[error("TracingInit: {source}")]
    TracingInit {
        #[source]
        source: utils_trace::TracingInitError,
    },
    #[error("GitHubClient: {source}")]
    GitHubClient {
        #[source]
        source: NewGitHubClientError,
    },
    #[error("TcpListenerBind: {source}")]
    TcpListenerBind {
        #[source]
        source: std::io::Error,
    },
    #[error("Serve: {source}")]
    Serve {
        #[source]
        source: std::io::Error,
    },
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|source| MainError::Config { source })?;

    utils_trace::init(&config.log_level)
        .map_err(|source| MainError::TracingInit { source })?;

    let github = GitHubClient::new(config.github_token.clone())
        .map_err(|source| MainError::GitHubClient { source })?;

    let addr = config.bind_addr;
    info!(
        default_user = %config.github_username,
        site_url = %config.site_url,
        authenticated = config.github_token.is_some(),
        "Portfolio backend configured"
    );

    let state = AppState::new(config, Arc::new(github), Arc::new(LogContactSink));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| MainError::TcpListenerBind { source })?;

    info!("Server running on addr: {}", addr);

    serve(listener, app)
        .await
        .map_err(|source| MainError::Serve { source })?;

    Ok(())
}
