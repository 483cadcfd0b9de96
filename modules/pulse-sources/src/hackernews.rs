//! Hacker News client: current top stories, filtered to AI/ML titles.

use anyhow::{anyhow, Result};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::debug;

const HN_API_URL: &str = "https://hacker-news.firebaseio.com";

/// How many of the current top stories to examine per run.
const TOP_WINDOW: usize = 30;

/// Case-insensitive substrings that mark a title as AI/ML-related.
const AI_KEYWORDS: &[&str] = &[
    "ai", "ml", "llm", "gpt", "claude", "llama", "gemini", "mistral",
    "transformer", "neural", "openai", "anthropic", "deep learning",
    "machine learning", "artificial intelligence", "diffusion", "fine-tune",
    "benchmark", "embedding", "rag", "agent", "copilot", "chatbot",
    "foundation model", "language model", "generative", "inference",
    "hugging face", "stable diffusion", "midjourney", "deepseek",
];

/// A trending discussion item, normalized from the HN item format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionItem {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub score: u32,
    pub author: String,
    /// Submission time, unix seconds.
    pub time: i64,
    pub comment_count: u32,
}

/// Raw item payload. Deleted or dead items come back as `null` or with
/// fields missing, so everything except `id` is optional.
#[derive(Debug, Deserialize)]
struct RawItem {
    id: u64,
    title: Option<String>,
    url: Option<String>,
    score: Option<u32>,
    by: Option<String>,
    time: Option<i64>,
    descendants: Option<u32>,
}

pub struct HackerNewsClient {
    http: reqwest::Client,
    base_url: String,
}

impl HackerNewsClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: HN_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Fetch the current top-story window and keep AI/ML-titled items.
    pub async fn fetch_top(&self) -> Result<Vec<DiscussionItem>> {
        let ids: Vec<u64> = self
            .get_json(&format!("{}/v0/topstories.json", self.base_url))
            .await?;

        let fetches = ids
            .into_iter()
            .take(TOP_WINDOW)
            .map(|id| self.fetch_item(id));
        let items = try_join_all(fetches).await?;

        let stories: Vec<DiscussionItem> = items
            .into_iter()
            .flatten()
            .filter_map(normalize)
            .filter(|s| is_ai_related(&s.title))
            .collect();

        debug!(stories = stories.len(), "Hacker News fetch complete");
        Ok(stories)
    }

    async fn fetch_item(&self, id: u64) -> Result<Option<RawItem>> {
        self.get_json(&format!("{}/v0/item/{id}.json", self.base_url))
            .await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(anyhow!("Hacker News API error ({})", response.status()));
        }
        Ok(response.json().await?)
    }
}

/// Drop items without a title; fall back to the discussion thread URL when
/// the story carries no external link.
fn normalize(raw: RawItem) -> Option<DiscussionItem> {
    let title = raw.title?;
    let url = raw
        .url
        .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", raw.id));
    Some(DiscussionItem {
        id: raw.id,
        title,
        url,
        score: raw.score.unwrap_or(0),
        author: raw.by.unwrap_or_default(),
        time: raw.time.unwrap_or(0),
        comment_count: raw.descendants.unwrap_or(0),
    })
}

fn is_ai_related(title: &str) -> bool {
    let lower = title.to_lowercase();
    AI_KEYWORDS.iter().any(|kw| lower.contains(kw))
}
