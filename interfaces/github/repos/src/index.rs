use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::RemoteRepository;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const USER_AGENT: &str = "portfolio-rust-client";
const API_VERSION: &str = "2022-11-28";
const ACCEPT_JSON: &str = "application/vnd.github+json";
const ACCEPT_RAW: &str = "application/vnd.github.raw";

/// Result of one listing page request.
#[derive(Debug, Clone, PartialEq)]
pub enum ListUserReposOutcome {
    Page(Vec<RemoteRepository>),
    /// GitHub answered with a non-success status (rate limit, unknown user, ...).
    Rejected { status: StatusCode },
}

#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Whether requests carry a bearer credential.
    fn has_token(&self) -> bool;

    /// One page of the user's public repositories, most recently updated first.
    async fn list_user_repos(
        &self,
        user: &str,
        per_page: u32,
        page: u32,
    ) -> Result<ListUserReposOutcome, ListUserReposError>;

    /// Raw readme text, `None` when GitHub answers with a non-success status.
    async fn fetch_readme(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<String>, FetchReadmeError>;
}

pub struct GitHubClient {
    http: Client,
    api_base: Url,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self, NewGitHubClientError> {
        Self::with_api_base(DEFAULT_API_BASE, token)
    }

    pub fn with_api_base(
        api_base: &str,
        token: Option<String>,
    ) -> Result<Self, NewGitHubClientError> {
        let api_base = Url::parse(api_base)
            .map_err(|source| NewGitHubClientError::ParseApiBase { source })?;

        if api_base.cannot_be_a_base() {
            return Err(NewGitHubClientError::NotABase { api_base: api_base.to_string() });
        }

        let token = token.filter(|t| !t.trim().is_empty());

        Ok(Self { http: Client::new(), api_base, token })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, InvalidEndpointError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| InvalidEndpointError { api_base: self.api_base.to_string() })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url, accept: &'static str) -> RequestBuilder {
        let request = self
            .http
            .get(url)
            .header(header::ACCEPT, accept)
            .header(header::USER_AGENT, USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION);

        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    fn has_token(&self) -> bool {
        self.token.is_some()
    }

    async fn list_user_repos(
        &self,
        user: &str,
        per_page: u32,
        page: u32,
    ) -> Result<ListUserReposOutcome, ListUserReposError> {
        let url = self.endpoint(&["users", user, "repos"])?;

        let response = self
            .get(url, ACCEPT_JSON)
            .query(&[("type", "public"), ("sort", "updated")])
            .query(&[("per_page", per_page), ("page", page)])
            .send()
            .await
            .map_err(|source| ListUserReposError::RequestSend { source })?;

        let status = response.status();
        if !status.is_success() {
            debug!(user, page, %status, "Repository listing rejected");
            return Ok(ListUserReposOutcome::Rejected { status });
        }

        let body = response
            .text()
            .await
            .map_err(|source| ListUserReposError::ResponseRead { source })?;

        let repos: Vec<RemoteRepository> = serde_json::from_str(&body)?;

        Ok(ListUserReposOutcome::Page(repos))
    }

    async fn fetch_readme(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<String>, FetchReadmeError> {
        let url = self.endpoint(&["repos", owner, repo, "readme"])?;

        let response = self
            .get(url, ACCEPT_RAW)
            .send()
            .await
            .map_err(|source| FetchReadmeError::RequestSend { source })?;

        let status = response.status();
        if !status.is_success() {
            debug!(owner, repo, %status, "Readme unavailable");
            return Ok(None);
        }

        let text = response
            .text()
            .await
            .map_err(|source| FetchReadmeError::ResponseRead { source })?;

        Ok(Some(text))
    }
}

#[derive(Debug, Error)]
pub enum NewGitHubClientError {
    #[error("ParseApiBase: {source}")]
    ParseApiBase {
        source: url::ParseError,
    },

    #[error("NotABase: {api_base}")]
    NotABase {
        api_base: String,
    },
}

#[derive(Debug, Error)]
#[error("Cannot append path segments to {api_base}")]
pub struct InvalidEndpointError {
    pub api_base: String,
}

#[derive(Debug, Error)]
pub enum ListUserReposError {
    #[error("InvalidEndpoint: {source}")]
    InvalidEndpoint {
        #[from]
        source: InvalidEndpointError,
    },

    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },

    #[error("DeserializeResponseBody: {source}")]
    DeserializeResponseBody {
        #[from]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum FetchReadmeError {
    #[error("InvalidEndpoint: {source}")]
    InvalidEndpoint {
        #[from]
        source: InvalidEndpointError,
    },

    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}
