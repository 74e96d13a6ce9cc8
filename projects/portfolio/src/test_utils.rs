use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::to_bytes, http::StatusCode, response::Response};
use chrono::{TimeZone, Utc};
use interfaces_github_repos::{
    index::{
        FetchReadmeError, GitHubApi, InvalidEndpointError, ListUserReposError,
        ListUserReposOutcome,
    },
    models::RemoteRepository,
};

use crate::config::Config;
use crate::models::ContactSubmission;
use crate::state::AppState;
use crate::utils::contact_sink::ContactSink;

pub fn remote_repo(id: u64, name: &str) -> RemoteRepository {
    RemoteRepository {
        id,
        name: name.to_string(),
        full_name: format!("octo/{name}"),
        html_url: format!("https://github.com/octo/{name}"),
        description: None,
        language: None,
        topics: Vec::new(),
        fork: false,
        stargazers_count: 3,
        updated_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap(),
        default_branch: "main".to_string(),
    }
}

pub fn remote_repos(ids: std::ops::RangeInclusive<u64>) -> Vec<RemoteRepository> {
    ids.map(|id| remote_repo(id, &format!("repo-{id}"))).collect()
}

pub enum PageScript {
    Page(Vec<RemoteRepository>),
    Rejected(StatusCode),
    Broken,
}

pub enum ReadmeScript {
    Text(String),
    Broken,
}

/// Scripted GitHub. Pages past the script are empty, readmes not scripted are 404.
#[derive(Default)]
pub struct FakeGitHub {
    token: bool,
    pages: Vec<PageScript>,
    readmes: HashMap<String, ReadmeScript>,
    pub list_calls: Mutex<Vec<(String, u32, u32)>>,
    pub readme_calls: AtomicUsize,
}

impl FakeGitHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self) -> Self {
        self.token = true;
        self
    }

    pub fn with_page(mut self, page: PageScript) -> Self {
        self.pages.push(page);
        self
    }

    pub fn with_readme(mut self, repo: &str, readme: &str) -> Self {
        self.readmes.insert(repo.to_string(), ReadmeScript::Text(readme.to_string()));
        self
    }

    pub fn with_broken_readme(mut self, repo: &str) -> Self {
        self.readmes.insert(repo.to_string(), ReadmeScript::Broken);
        self
    }

    pub fn pages_requested(&self) -> Vec<u32> {
        self.list_calls.lock().unwrap().iter().map(|(_, _, page)| *page).collect()
    }

    pub fn readmes_requested(&self) -> usize {
        self.readme_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GitHubApi for FakeGitHub {
    fn has_token(&self) -> bool {
        self.token
    }

    async fn list_user_repos(
        &self,
        user: &str,
        per_page: u32,
        page: u32,
    ) -> Result<ListUserReposOutcome, ListUserReposError> {
        self.list_calls.lock().unwrap().push((user.to_string(), per_page, page));

        match self.pages.get(page as usize - 1) {
            Some(PageScript::Page(repos)) => Ok(ListUserReposOutcome::Page(repos.clone())),
            Some(PageScript::Rejected(status)) => {
                Ok(ListUserReposOutcome::Rejected { status: *status })
            }
            Some(PageScript::Broken) => Err(serde_json::from_str::<Vec<RemoteRepository>>("<html>")
                .unwrap_err()
                .into()),
            None => Ok(ListUserReposOutcome::Page(Vec::new())),
        }
    }

    async fn fetch_readme(
        &self,
        _owner: &str,
        repo: &str,
    ) -> Result<Option<String>, FetchReadmeError> {
        self.readme_calls.fetch_add(1, Ordering::SeqCst);

        match self.readmes.get(repo) {
            Some(ReadmeScript::Text(text)) => Ok(Some(text.clone())),
            Some(ReadmeScript::Broken) => Err(InvalidEndpointError {
                api_base: "mailto:nobody".to_string(),
            }
            .into()),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct RecordingSink {
    pub fail: bool,
    pub recorded: Mutex<Vec<ContactSubmission>>,
}

#[async_trait]
impl ContactSink for RecordingSink {
    async fn record(&self, submission: &ContactSubmission) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("mail relay unreachable");
        }
        self.recorded.lock().unwrap().push(submission.clone());
        Ok(())
    }
}

pub fn test_state(github: Arc<FakeGitHub>, sink: Arc<RecordingSink>) -> AppState {
    let config = Config {
        github_username: "octo".to_string(),
        ..Config::default()
    };
    AppState::new(config, github, sink)
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
