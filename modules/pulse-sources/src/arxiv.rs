//! arXiv client: recent cs.AI / cs.LG submissions via the Atom export API.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";
const CATEGORY_QUERY: &str = "cat:cs.AI OR cat:cs.LG";
const MAX_RESULTS: usize = 20;

/// A normalized research paper entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub title: String,
    pub authors: Vec<String>,
    pub abstract_text: String,
    pub url: String,
    pub published: Option<DateTime<Utc>>,
}

pub struct ArxivClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArxivClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: ARXIV_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Fetch the most recent submissions in the tracked categories.
    pub async fn fetch_recent(&self) -> Result<Vec<Paper>> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("search_query", CATEGORY_QUERY),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
                ("max_results", &MAX_RESULTS.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("arXiv API error ({})", response.status()));
        }

        let body = response.bytes().await?;
        let papers = parse_feed(&body)?;
        debug!(papers = papers.len(), "arXiv fetch complete");
        Ok(papers)
    }
}

/// Decode the Atom payload. A malformed entry is skipped, not fatal: one bad
/// record must not sink the whole feed. An unparseable document is fatal.
fn parse_feed(body: &[u8]) -> Result<Vec<Paper>> {
    let feed = feed_rs::parser::parse(body)?;

    let mut papers = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let Some(title) = entry.title.map(|t| collapse_whitespace(&t.content)) else {
            warn!(id = %entry.id, "Skipping arXiv entry without a title");
            continue;
        };
        if entry.id.is_empty() {
            warn!(title = %title, "Skipping arXiv entry without an id");
            continue;
        }

        papers.push(Paper {
            title,
            authors: entry
                .authors
                .iter()
                .map(|a| a.name.trim().to_string())
                .collect(),
            abstract_text: entry
                .summary
                .map(|s| collapse_whitespace(&s.content))
                .unwrap_or_default(),
            url: entry.id,
            published: entry.published,
        });
    }

    Ok(papers)
}

/// arXiv wraps titles and abstracts across lines; fold runs of whitespace
/// into single spaces.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
