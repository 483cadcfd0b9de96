//! GitHub releases client: recent release events from a fixed set of
//! tracked repositories.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use futures::future::try_join_all;
use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::debug;

const GITHUB_API_URL: &str = "https://api.github.com";

/// Repositories whose releases feed the briefing.
const TRACKED_REPOS: &[&str] = &[
    "huggingface/transformers",
    "pytorch/pytorch",
    "ggml-org/llama.cpp",
    "ollama/ollama",
    "vllm-project/vllm",
    "langchain-ai/langchain",
    "openai/openai-python",
    "anthropics/anthropic-sdk-python",
];

/// How far back a release may be published and still count as recent.
const RELEASE_WINDOW_HOURS: i64 = 48;

/// Releases listed per repository; recent events live at the top of the list.
const PER_REPO_LIMIT: &str = "5";

/// A normalized release event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub repo: String,
    pub tag: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct RawRelease {
    tag_name: String,
    name: Option<String>,
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    draft: bool,
    #[serde(default)]
    prerelease: bool,
}

pub struct GitHubReleases {
    http: reqwest::Client,
    token: String,
    base_url: String,
}

impl GitHubReleases {
    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.to_string(),
            base_url: GITHUB_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Fetch releases published within the recent window across all tracked
    /// repositories.
    pub async fn fetch_recent(&self) -> Result<Vec<Release>> {
        let cutoff = Utc::now() - Duration::hours(RELEASE_WINDOW_HOURS);

        let fetches = TRACKED_REPOS
            .iter()
            .map(|repo| self.fetch_repo(repo, cutoff));
        let per_repo = try_join_all(fetches).await?;

        let releases: Vec<Release> = per_repo.into_iter().flatten().collect();
        debug!(releases = releases.len(), "GitHub release fetch complete");
        Ok(releases)
    }

    async fn fetch_repo(&self, repo: &str, cutoff: DateTime<Utc>) -> Result<Vec<Release>> {
        let url = format!("{}/repos/{repo}/releases", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("per_page", PER_REPO_LIMIT)])
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::USER_AGENT, "pulse-briefing")
            .header(header::ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "GitHub API error for {repo} ({})",
                response.status()
            ));
        }

        let raw: Vec<RawRelease> = response.json().await?;
        Ok(recent_releases(repo, raw, cutoff))
    }
}

/// Keep published, non-draft, non-prerelease events inside the window.
fn recent_releases(repo: &str, raw: Vec<RawRelease>, cutoff: DateTime<Utc>) -> Vec<Release> {
    raw.into_iter()
        .filter(|r| !r.draft && !r.prerelease)
        .filter(|r| r.published_at.map(|t| t >= cutoff).unwrap_or(false))
        .map(|r| Release {
            repo: repo.to_string(),
            tag: r.tag_name.clone(),
            title: r.name.filter(|n| !n.is_empty()).unwrap_or(r.tag_name),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(tag: &str, name: Option<&str>, hours_ago: i64) -> RawRelease {
        RawRelease {
            tag_name: tag.to_string(),
            name: name.map(str::to_string),
            published_at: Some(Utc::now() - Duration::hours(hours_ago)),
            draft: false,
            prerelease: false,
        }
    }

    #[test]
    fn keeps_only_releases_inside_the_window() {
        let cutoff = Utc::now() - Duration::hours(RELEASE_WINDOW_HOURS);
        let releases = recent_releases(
            "acme/widget",
            vec![raw("v2.0.0", Some("Widget 2.0"), 3), raw("v1.9.0", None, 200)],
            cutoff,
        );
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].tag, "v2.0.0");
        assert_eq!(releases[0].title, "Widget 2.0");
    }

    #[test]
    fn title_falls_back_to_tag() {
        let cutoff = Utc::now() - Duration::hours(RELEASE_WINDOW_HOURS);
        let releases = recent_releases("acme/widget", vec![raw("v2.1.0", None, 1)], cutoff);
        assert_eq!(releases[0].title, "v2.1.0");
    }

    #[test]
    fn drafts_and_prereleases_are_excluded() {
        let cutoff = Utc::now() - Duration::hours(RELEASE_WINDOW_HOURS);
        let mut draft = raw("v3.0.0-draft", None, 1);
        draft.draft = true;
        let mut pre = raw("v3.0.0-rc1", None, 1);
        pre.prerelease = true;
        let mut unpublished = raw("v3.0.0", None, 1);
        unpublished.published_at = None;

        let releases = recent_releases("acme/widget", vec![draft, pre, unpublished], cutoff);
        assert!(releases.is_empty());
    }
}
