// Trait seams for the pipeline's dependencies.
//
// Each external feed and the synthesis call sit behind one async trait so
// pipeline tests run against in-memory mocks: no network, no model calls.

use anyhow::Result;
use async_trait::async_trait;

use pulse_sources::{
    ArxivClient, DiscussionItem, GitHubReleases, HackerNewsClient, Paper, Release,
};

use crate::synthesizer::{Synthesis, Synthesizer};

#[async_trait]
pub trait DiscussionSource: Send + Sync {
    /// Current trending discussion items, already keyword-filtered.
    async fn fetch(&self) -> Result<Vec<DiscussionItem>>;
}

#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Most recent research papers in the tracked categories.
    async fn fetch(&self) -> Result<Vec<Paper>>;
}

#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Recent release events from the tracked repositories.
    async fn fetch(&self) -> Result<Vec<Release>>;
}

#[async_trait]
pub trait Synthesize: Send + Sync {
    /// Turn the three normalized lists into one validated briefing.
    async fn synthesize(
        &self,
        stories: &[DiscussionItem],
        papers: &[Paper],
        releases: &[Release],
    ) -> Result<Synthesis>;
}

#[async_trait]
impl DiscussionSource for HackerNewsClient {
    async fn fetch(&self) -> Result<Vec<DiscussionItem>> {
        self.fetch_top().await
    }
}

#[async_trait]
impl PaperSource for ArxivClient {
    async fn fetch(&self) -> Result<Vec<Paper>> {
        self.fetch_recent().await
    }
}

#[async_trait]
impl ReleaseSource for GitHubReleases {
    async fn fetch(&self) -> Result<Vec<Release>> {
        self.fetch_recent().await
    }
}

#[async_trait]
impl Synthesize for Synthesizer {
    async fn synthesize(
        &self,
        stories: &[DiscussionItem],
        papers: &[Paper],
        releases: &[Release],
    ) -> Result<Synthesis> {
        Ok(Synthesizer::synthesize(self, stories, papers, releases).await?)
    }
}
