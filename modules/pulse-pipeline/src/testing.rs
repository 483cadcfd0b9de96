// Test mocks for the briefing pipeline.
//
// One mock per trait boundary, in-memory and deterministic:
// - MockDiscussions / MockPapers / MockReleases return fixed lists, with
//   optional leading failures for retry tests and a call counter
// - MockSynthesizer returns a fixed briefing or a forced failure
//
// Plus fixture helpers for the source item types.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use pulse_common::BriefingResult;
use pulse_sources::{DiscussionItem, Paper, Release};

use crate::synthesizer::Synthesis;
use crate::traits::{DiscussionSource, PaperSource, ReleaseSource, Synthesize};

/// Fixed discussion feed. `failing_times(n)` makes the first n calls fail.
pub struct MockDiscussions {
    items: Vec<DiscussionItem>,
    failures_remaining: Mutex<u32>,
    calls: AtomicU32,
}

impl MockDiscussions {
    pub fn returning(items: Vec<DiscussionItem>) -> Self {
        Self {
            items,
            failures_remaining: Mutex::new(0),
            calls: AtomicU32::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    pub fn failing_times(self, failures: u32) -> Self {
        *self.failures_remaining.lock().unwrap() = failures;
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscussionSource for MockDiscussions {
    async fn fetch(&self) -> Result<Vec<DiscussionItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut remaining = self.failures_remaining.lock().unwrap();
        if *remaining > 0 {
            *remaining -= 1;
            bail!("MockDiscussions: forced fetch failure");
        }
        Ok(self.items.clone())
    }
}

/// Fixed paper feed.
pub struct MockPapers {
    items: Vec<Paper>,
    calls: AtomicU32,
}

impl MockPapers {
    pub fn returning(items: Vec<Paper>) -> Self {
        Self {
            items,
            calls: AtomicU32::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaperSource for MockPapers {
    async fn fetch(&self) -> Result<Vec<Paper>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }
}

/// Fixed release feed.
pub struct MockReleases {
    items: Vec<Release>,
    calls: AtomicU32,
}

impl MockReleases {
    pub fn returning(items: Vec<Release>) -> Self {
        Self {
            items,
            calls: AtomicU32::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for MockReleases {
    async fn fetch(&self) -> Result<Vec<Release>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.items.clone())
    }
}

/// Fixed synthesizer. Counts calls; can be forced to fail.
pub struct MockSynthesizer {
    briefing: BriefingResult,
    fail: bool,
    calls: AtomicU32,
}

impl MockSynthesizer {
    pub fn returning(briefing: BriefingResult) -> Self {
        Self {
            briefing,
            fail: false,
            calls: AtomicU32::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            briefing: test_briefing("unused"),
            fail: true,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesize for MockSynthesizer {
    async fn synthesize(
        &self,
        _stories: &[DiscussionItem],
        _papers: &[Paper],
        _releases: &[Release],
    ) -> Result<Synthesis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            bail!("MockSynthesizer: forced synthesis failure");
        }
        Ok(Synthesis {
            briefing: self.briefing.clone(),
            tokens_used: 1234,
        })
    }
}

// ---------------------------------------------------------------------------
// Fixture helpers
// ---------------------------------------------------------------------------

/// A minimal valid briefing with the given headline.
pub fn test_briefing(headline: &str) -> BriefingResult {
    BriefingResult {
        headline: headline.to_string(),
        stories: Vec::new(),
        papers: Vec::new(),
        releases: Vec::new(),
        trend: "Quiet day across the ecosystem.".to_string(),
    }
}

/// A discussion item with the given id and title.
pub fn discussion_item(id: u64, title: &str) -> DiscussionItem {
    DiscussionItem {
        id,
        title: title.to_string(),
        url: format!("https://news.ycombinator.com/item?id={id}"),
        score: 100,
        author: "tester".to_string(),
        time: 1_700_000_000,
        comment_count: 10,
    }
}

/// A paper with the given title.
pub fn test_paper(title: &str) -> Paper {
    Paper {
        title: title.to_string(),
        authors: vec!["Ada Lovelace".to_string()],
        abstract_text: "An abstract.".to_string(),
        url: "https://arxiv.org/abs/0000.0000".to_string(),
        published: None,
    }
}

/// A release event for the given repo and tag.
pub fn test_release(repo: &str, tag: &str) -> Release {
    Release {
        repo: repo.to_string(),
        tag: tag.to_string(),
        title: tag.to_string(),
    }
}
