use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// A repository as returned by `GET /users/{user}/repos`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteRepository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub topics: Vec<String>,
    pub fork: bool,
    pub stargazers_count: u64,
    pub updated_at: DateTime<Utc>,
    pub default_branch: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
