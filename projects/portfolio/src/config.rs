use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_GITHUB_USERNAME: &str = "sanjayrohith";
pub const DEFAULT_SITE_URL: &str = "https://example.com";
pub const DEFAULT_EXCLUDED_REPOS: [&str; 2] = ["sanjayrohith", "seegpa"];
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Account listed when a request does not name one.
    pub github_username: String,
    pub github_token: Option<String>,
    /// Public base URL of the site. Not interpreted by the backend.
    pub site_url: String,
    /// Repository names never listed, compared case-insensitively.
    pub excluded_repos: Vec<String>,
    pub bind_addr: SocketAddr,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_username: DEFAULT_GITHUB_USERNAME.to_string(),
            github_token: None,
            site_url: DEFAULT_SITE_URL.to_string(),
            excluded_repos: DEFAULT_EXCLUDED_REPOS.iter().map(|s| s.to_string()).collect(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBindAddr { value: bind_addr.clone(), source })?;

        let excluded_repos: Vec<String> = match get("EXCLUDED_REPOS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_EXCLUDED_REPOS.iter().map(|s| s.to_string()).collect(),
        };

        Ok(Self {
            github_username: get("GITHUB_USERNAME")
                .unwrap_or_else(|| DEFAULT_GITHUB_USERNAME.to_string()),
            github_token: get("GITHUB_TOKEN"),
            site_url: get("SITE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_SITE_URL.to_string()),
            excluded_repos,
            bind_addr,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("InvalidBindAddr: {value}: {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}
