use chrono::{DateTime, Utc};
use interfaces_github_repos::models::RemoteRepository;
use serde::Serialize;

pub const DESCRIPTION_PLACEHOLDER: &str = "No description provided.";
pub const MAX_TAGS: usize = 3;

/// A repository as served to the projects section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRepository {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub tags: Vec<String>,
    pub image: String,
    pub updated_at: DateTime<Utc>,
    pub stars: u64,
}

impl AggregatedRepository {
    pub fn from_remote(remote: RemoteRepository, image: String) -> Self {
        let tags = remote
            .language
            .into_iter()
            .chain(remote.topics)
            .take(MAX_TAGS)
            .collect();

        Self {
            id: remote.id.to_string(),
            title: remote.name,
            description: remote
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
            url: remote.html_url,
            tags,
            image,
            updated_at: remote.updated_at,
            stars: remote.stargazers_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReposResponse {
    pub repos: Vec<AggregatedRepository>,
}

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub message: String,
}
