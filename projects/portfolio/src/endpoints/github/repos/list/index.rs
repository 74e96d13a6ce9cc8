use std::collections::HashSet;

use axum::{
    extract::{Extension, RawQuery},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::future::join_all;
use interfaces_github_repos::{
    index::{GitHubApi, ListUserReposError, ListUserReposOutcome},
    models::RemoteRepository,
};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    models::{AggregatedRepository, ReposResponse},
    state::AppState,
    utils::readme_image::ImagePolicy,
};

pub const DEFAULT_PER_PAGE: u32 = 12;
pub const MAX_REQUESTED_PER_PAGE: u32 = 100;
/// Upstream page size cap, whatever the caller asks for.
pub const MAX_EFFECTIVE_PER_PAGE: u32 = 30;
pub const DEFAULT_MAX_PAGES: u32 = 5;
pub const MAX_PAGES_CAP: u32 = 10;
pub const README_FETCHES_ANONYMOUS: usize = 10;
pub const README_FETCHES_AUTHENTICATED: usize = 50;

pub const SUCCESS_CACHE_CONTROL: &str = "public, s-maxage=600, stale-while-revalidate=3600";
pub const FALLBACK_CACHE_CONTROL: &str = "public, s-maxage=300, stale-while-revalidate=1800";

/// Listing parameters after defaults and clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingParams {
    pub user: String,
    pub per_page: u32,
    pub max_pages: u32,
}

impl ListingParams {
    /// First occurrence of each key wins. Missing, blank or non-numeric values take the default.
    /// Numbers are read as decimals (`1e3`, `2.9`), clamped, then truncated.
    pub fn from_query(query: Option<&str>, default_user: &str) -> Self {
        let pairs: Vec<(String, String)> = query
            .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .filter(|v| !v.is_empty())
        };

        let number = |key: &str, default: u32, max: u32| {
            get(key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|n| !n.is_nan())
                .map_or(default, |n| n.clamp(1.0, f64::from(max)) as u32)
        };

        let requested_per_page = number("per_page", DEFAULT_PER_PAGE, MAX_REQUESTED_PER_PAGE);

        Self {
            user: get("user").unwrap_or(default_user).to_string(),
            per_page: requested_per_page.min(MAX_EFFECTIVE_PER_PAGE),
            max_pages: number("max_pages", DEFAULT_MAX_PAGES, MAX_PAGES_CAP),
        }
    }
}

/// Axum handler: GET /api/github-repos
///
/// Always answers 200. Any aggregation failure is logged and served as an empty list.
pub async fn handler(
    Extension(state): Extension<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let params = ListingParams::from_query(query.as_deref(), &state.config.github_username);

    match fetch_and_aggregate_repositories(
        state.github.as_ref(),
        &params,
        &state.config.excluded_repos,
        &state.image_policy,
    )
    .await
    {
        Ok(repos) => repos_response(repos, SUCCESS_CACHE_CONTROL),
        Err(err) => {
            error!(user = %params.user, error = %err, "GitHub repos aggregation failed");
            repos_response(Vec::new(), FALLBACK_CACHE_CONTROL)
        }
    }
}

fn repos_response(repos: Vec<AggregatedRepository>, cache_control: &'static str) -> Response {
    (
        StatusCode::OK,
        [(header::CACHE_CONTROL, cache_control)],
        Json(ReposResponse { repos }),
    )
        .into_response()
}

#[derive(Debug, Error)]
pub enum AggregateRepositoriesError {
    #[error("ListUserRepos: {source}")]
    ListUserRepos {
        #[from]
        source: ListUserReposError,
    },
}

pub async fn fetch_and_aggregate_repositories(
    github: &dyn GitHubApi,
    params: &ListingParams,
    excluded: &[String],
    policy: &ImagePolicy,
) -> Result<Vec<AggregatedRepository>, AggregateRepositoriesError> {
    let fetched = fetch_all_pages(github, params).await?;
    let repos = filter_repositories(fetched, excluded);

    let budget = repos.len().min(if github.has_token() {
        README_FETCHES_AUTHENTICATED
    } else {
        README_FETCHES_ANONYMOUS
    });

    let mut images = join_all(
        repos[..budget]
            .iter()
            .map(|repo| resolve_image(github, &params.user, repo, policy)),
    )
    .await;

    images.extend(
        repos[budget..]
            .iter()
            .map(|repo| policy.fallback_image(&params.user, &repo.name)),
    );

    Ok(repos
        .into_iter()
        .zip(images)
        .map(|(repo, image)| AggregatedRepository::from_remote(repo, image))
        .collect())
}

/// Pages until a short page, a rejected page, or the page cap.
async fn fetch_all_pages(
    github: &dyn GitHubApi,
    params: &ListingParams,
) -> Result<Vec<RemoteRepository>, ListUserReposError> {
    let mut repos = Vec::new();

    for page in 1..=params.max_pages {
        let items = match github.list_user_repos(&params.user, params.per_page, page).await? {
            ListUserReposOutcome::Page(items) => items,
            ListUserReposOutcome::Rejected { status } => {
                warn!(user = %params.user, page, %status, "Repository listing stopped early");
                break;
            }
        };

        let last_page = items.len() < params.per_page as usize;
        repos.extend(items);
        if last_page {
            break;
        }
    }

    Ok(repos)
}

/// Drops repeated ids (first wins), forks, then excluded names.
pub fn filter_repositories(
    repos: Vec<RemoteRepository>,
    excluded: &[String],
) -> Vec<RemoteRepository> {
    let excluded: HashSet<String> = excluded.iter().map(|name| name.to_lowercase()).collect();
    let mut seen = HashSet::new();

    repos
        .into_iter()
        .filter(|repo| seen.insert(repo.id))
        .filter(|repo| !repo.fork)
        .filter(|repo| !excluded.contains(&repo.name.to_lowercase()))
        .collect()
}

async fn resolve_image(
    github: &dyn GitHubApi,
    owner: &str,
    repo: &RemoteRepository,
    policy: &ImagePolicy,
) -> String {
    let readme = match github.fetch_readme(owner, &repo.name).await {
        Ok(readme) => readme,
        Err(err) => {
            debug!(repo = %repo.name, error = %err, "Readme fetch failed");
            None
        }
    };

    readme
        .and_then(|text| policy.resolve(&text, owner, &repo.name, &repo.default_branch))
        .unwrap_or_else(|| policy.fallback_image(owner, &repo.name))
}
