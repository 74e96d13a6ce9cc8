//! Picks a preview image for a repository out of its readme text.
//!
//! Candidates come from markdown `![alt](url "title")` images first, then
//! `<img src="...">` tags. The first candidate that is relative, or absolute on
//! an approved raw-content host without looking like a badge or an SVG, wins.
//! Otherwise the first candidate is used. The chosen reference must end up on
//! an approved raw-content host or it is discarded.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

pub const RAW_CONTENT_HOST: &str = "raw.githubusercontent.com";
pub const FALLBACK_IMAGE_BASE: &str = "https://opengraph.githubassets.com/1";

pub const APPROVED_HOSTS: [&str; 3] = [
    RAW_CONTENT_HOST,
    "user-images.githubusercontent.com",
    "media.githubusercontent.com",
];

pub const BADGE_HOST_HINTS: [&str; 7] = [
    "shields.io",
    "badgen.net",
    "badge.fury.io",
    "circleci.com",
    "travis-ci",
    "github-readme-stats",
    "komarev.com",
];

/// Matched as case-insensitive substrings of the whole URL, so `.../build/shot.png` counts too.
pub const BADGE_KEYWORDS: [&str; 4] = ["badge", "build", "coverage", "ci"];

static MARKDOWN_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"!\[[^\]]*\]\(([^)\s]+)(?:\s+"[^"]*")?\)"#).unwrap());
static HTML_IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)<img\s+[^>]*src=["']([^"']+)["'][^>]*>"#).unwrap());
static ABSOLUTE_HTTP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").unwrap());
static GITHUB_FILE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^/([^/]+)/([^/]+)/(?:raw|blob)/([^/]+)/(.+)$").unwrap());

#[derive(Debug, Clone, PartialEq)]
pub struct ImagePolicy {
    pub approved_hosts: Vec<String>,
    pub badge_host_hints: Vec<String>,
    pub badge_keywords: Vec<String>,
    pub fallback_base: String,
}

impl Default for ImagePolicy {
    fn default() -> Self {
        Self {
            approved_hosts: owned(&APPROVED_HOSTS),
            badge_host_hints: owned(&BADGE_HOST_HINTS),
            badge_keywords: owned(&BADGE_KEYWORDS),
            fallback_base: FALLBACK_IMAGE_BASE.to_string(),
        }
    }
}

impl ImagePolicy {
    /// Social preview image, always available.
    pub fn fallback_image(&self, owner: &str, repo: &str) -> String {
        format!("{}/{owner}/{repo}", self.fallback_base.trim_end_matches('/'))
    }

    pub fn is_badge_like(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.badge_host_hints.iter().any(|hint| url.contains(hint.as_str()))
            || self
                .badge_keywords
                .iter()
                .any(|keyword| lower.contains(&keyword.to_lowercase()))
    }

    fn approves(&self, host: &str) -> bool {
        self.approved_hosts.iter().any(|approved| approved == host)
    }

    /// First preferred candidate, else the first candidate at all.
    pub fn pick_candidate<'a>(&self, candidates: &'a [String]) -> Option<&'a str> {
        candidates
            .iter()
            .find(|candidate| self.is_preferred(candidate))
            .or_else(|| candidates.first())
            .map(String::as_str)
    }

    fn is_preferred(&self, candidate: &str) -> bool {
        if !is_absolute(candidate) {
            return true;
        }

        let normalized = normalize_github_url(candidate);
        let Ok(parsed) = Url::parse(&normalized) else {
            return false;
        };

        if self.is_badge_like(&normalized) || is_svg(&normalized) {
            return false;
        }

        parsed.host_str().is_some_and(|host| self.approves(host))
    }

    /// Resolves the readme's image to an absolute URL on an approved host.
    pub fn resolve(&self, readme: &str, owner: &str, repo: &str, branch: &str) -> Option<String> {
        let candidates = extract_candidates(readme);
        let chosen = self.pick_candidate(&candidates)?;

        let absolute = if is_absolute(chosen) {
            normalize_github_url(chosen)
        } else {
            let path = chosen.strip_prefix("./").unwrap_or(chosen);
            let path = path.strip_prefix('/').unwrap_or(path);
            format!("https://{RAW_CONTENT_HOST}/{owner}/{repo}/{branch}/{path}")
        };

        let parsed = Url::parse(&absolute).ok()?;
        match parsed.host_str() {
            Some(host) if self.approves(host) => Some(parsed.to_string()),
            _ => None,
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// All image references in order: markdown images, then `<img>` tags.
pub fn extract_candidates(readme: &str) -> Vec<String> {
    MARKDOWN_IMAGE
        .captures_iter(readme)
        .chain(HTML_IMAGE.captures_iter(readme))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|candidate| !candidate.is_empty())
        .map(str::to_string)
        .collect()
}

/// Rewrites `github.com/{o}/{r}/(blob|raw)/{branch}/{path}` to the raw-content host.
pub fn normalize_github_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };

    if parsed.host_str() != Some("github.com") {
        return url.to_string();
    }

    match GITHUB_FILE_PATH.captures(parsed.path()) {
        Some(caps) => format!(
            "https://{RAW_CONTENT_HOST}/{}/{}/{}/{}",
            &caps[1], &caps[2], &caps[3], &caps[4]
        ),
        None => url.to_string(),
    }
}

fn is_absolute(url: &str) -> bool {
    ABSOLUTE_HTTP.is_match(url)
}

fn is_svg(url: &str) -> bool {
    url.split('?')
        .next()
        .is_some_and(|path| path.to_lowercase().ends_with(".svg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(readme: &str) -> Option<String> {
        ImagePolicy::default().resolve(readme, "octo", "site", "main")
    }

    #[test]
    fn relative_markdown_image_resolves_against_default_branch() {
        assert_eq!(
            resolve("# Site\n\n![cover](./assets/preview.png)\n").as_deref(),
            Some("https://raw.githubusercontent.com/octo/site/main/assets/preview.png")
        );
    }

    #[test]
    fn root_relative_path_drops_leading_slash() {
        assert_eq!(
            resolve("![x](/docs/shot.jpg)").as_deref(),
            Some("https://raw.githubusercontent.com/octo/site/main/docs/shot.jpg")
        );
    }

    #[test]
    fn shields_badge_alone_is_discarded() {
        let readme =
            "![build](https://img.shields.io/github/actions/workflow/status/octo/site/ci.yml)";
        assert_eq!(resolve(readme), None);
    }

    #[test]
    fn readme_without_images_resolves_nothing() {
        assert_eq!(resolve("Just text, no pictures."), None);
    }

    #[test]
    fn blob_url_is_rewritten_to_raw_host() {
        assert_eq!(
            normalize_github_url("https://github.com/octo/site/blob/dev/img/hero.png?raw=true"),
            "https://raw.githubusercontent.com/octo/site/dev/img/hero.png"
        );
        assert_eq!(
            normalize_github_url("https://github.com/octo/site/raw/main/hero.gif"),
            "https://raw.githubusercontent.com/octo/site/main/hero.gif"
        );
    }

    #[test]
    fn other_urls_are_left_alone() {
        let url = "https://github.com/octo/site/issues/1";
        assert_eq!(normalize_github_url(url), url);
        assert_eq!(normalize_github_url("not a url"), "not a url");
    }

    #[test]
    fn approved_image_beats_earlier_badge() {
        let readme = "\
![ci](https://img.shields.io/badge/ci-passing-green.svg)
![demo](https://user-images.githubusercontent.com/1/demo.png)";
        assert_eq!(
            resolve(readme).as_deref(),
            Some("https://user-images.githubusercontent.com/1/demo.png")
        );
    }

    #[test]
    fn markdown_images_come_before_img_tags() {
        let readme = r#"<img src="https://media.githubusercontent.com/a.png">
![later](https://raw.githubusercontent.com/octo/site/main/b.png "Title")"#;
        assert_eq!(
            extract_candidates(readme),
            vec![
                "https://raw.githubusercontent.com/octo/site/main/b.png",
                "https://media.githubusercontent.com/a.png",
            ]
        );
    }

    #[test]
    fn img_tag_with_single_quotes_and_attributes() {
        let readme = "<p align=\"center\"><IMG width='300' SRC='docs/logo.png' alt='logo'></p>";
        assert_eq!(
            resolve(readme).as_deref(),
            Some("https://raw.githubusercontent.com/octo/site/main/docs/logo.png")
        );
    }

    #[test]
    fn svg_on_approved_host_is_not_preferred() {
        let readme = "\
![logo](https://raw.githubusercontent.com/octo/site/main/logo.SVG?v=2)
![shot](https://raw.githubusercontent.com/octo/site/main/shot.png)";
        assert_eq!(
            resolve(readme).as_deref(),
            Some("https://raw.githubusercontent.com/octo/site/main/shot.png")
        );
    }

    #[test]
    fn keyword_match_is_loose() {
        let readme = "\
![a](https://raw.githubusercontent.com/octo/site/main/build/shot.png)
![b](https://raw.githubusercontent.com/octo/site/main/docs/shot.png)";
        assert_eq!(
            resolve(readme).as_deref(),
            Some("https://raw.githubusercontent.com/octo/site/main/docs/shot.png")
        );
    }

    #[test]
    fn unpreferred_first_candidate_still_used_when_on_approved_host() {
        let readme = "![arch](https://raw.githubusercontent.com/octo/site/main/diagram.svg)";
        assert_eq!(
            resolve(readme).as_deref(),
            Some("https://raw.githubusercontent.com/octo/site/main/diagram.svg")
        );
    }

    #[test]
    fn first_candidate_on_foreign_host_is_discarded() {
        assert_eq!(resolve("![x](https://cdn.example.com/x.png)"), None);
    }

    #[test]
    fn fallback_image_uses_account_and_repo() {
        assert_eq!(
            ImagePolicy::default().fallback_image("octo", "site"),
            "https://opengraph.githubassets.com/1/octo/site"
        );
    }

    #[test]
    fn badge_hosts_and_keywords_are_configurable() {
        let policy = ImagePolicy {
            badge_host_hints: vec![],
            badge_keywords: vec!["STATUS".to_string()],
            ..ImagePolicy::default()
        };

        assert!(!policy.is_badge_like("https://img.shields.io/x.png"));
        assert!(policy.is_badge_like("https://example.com/status.png"));
    }
}
