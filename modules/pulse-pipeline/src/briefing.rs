//! Pipeline orchestrator: check, fetch, synthesize, persist.
//!
//! The pre-check is only a cheap short-circuit; the store's per-day
//! uniqueness constraint is what guarantees at most one briefing per day.
//! A lost check-then-insert race surfaces as an `AlreadyExists` insert and
//! is treated as success.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use tracing::{error, info};

use pulse_store::{BriefingStore, InsertOutcome, NewBriefing};

use crate::retry::{with_retry, RetryConfig};
use crate::traits::{DiscussionSource, PaperSource, ReleaseSource, Synthesize};

/// How a successful pipeline run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A new briefing was synthesized and stored.
    Created,
    /// A briefing for the date already existed (pre-check hit, or a
    /// concurrent run won the insert race).
    AlreadyExists,
}

pub struct BriefingPipeline {
    discussions: Arc<dyn DiscussionSource>,
    papers: Arc<dyn PaperSource>,
    releases: Arc<dyn ReleaseSource>,
    synthesizer: Arc<dyn Synthesize>,
    store: Arc<dyn BriefingStore>,
    model: String,
}

impl BriefingPipeline {
    pub fn new(
        discussions: Arc<dyn DiscussionSource>,
        papers: Arc<dyn PaperSource>,
        releases: Arc<dyn ReleaseSource>,
        synthesizer: Arc<dyn Synthesize>,
        store: Arc<dyn BriefingStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            discussions,
            papers,
            releases,
            synthesizer,
            store,
            model: model.into(),
        }
    }

    /// Run for today's UTC date.
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_for(Utc::now().date_naive()).await
    }

    /// One full pipeline run for a specific date. No internal retry; that is
    /// the caller's concern.
    pub async fn run_for(&self, date: NaiveDate) -> Result<RunOutcome> {
        if self
            .store
            .find_by_date(date)
            .await
            .context("briefing pre-check failed")?
            .is_some()
        {
            info!(%date, "Briefing already exists, skipping");
            return Ok(RunOutcome::AlreadyExists);
        }

        info!(%date, "Fetching sources");
        let (stories, papers, releases) = tokio::try_join!(
            async {
                self.discussions
                    .fetch()
                    .await
                    .context("discussion feed fetch failed")
            },
            async { self.papers.fetch().await.context("paper feed fetch failed") },
            async {
                self.releases
                    .fetch()
                    .await
                    .context("release feed fetch failed")
            },
        )?;
        info!(
            stories = stories.len(),
            papers = papers.len(),
            releases = releases.len(),
            "Sources fetched"
        );

        let synthesis = self
            .synthesizer
            .synthesize(&stories, &papers, &releases)
            .await
            .context("briefing synthesis failed")?;
        info!(tokens_used = synthesis.tokens_used, "Briefing synthesized");

        let record = NewBriefing {
            date,
            sources_snapshot: serde_json::json!({
                "hackernews": stories,
                "arxiv": papers,
                "github": releases,
            }),
            briefing: synthesis.briefing,
            model: self.model.clone(),
            tokens_used: synthesis.tokens_used,
        };

        match self
            .store
            .insert_if_absent(&record)
            .await
            .context("briefing insert failed")?
        {
            InsertOutcome::Inserted => {
                info!(%date, "Briefing stored");
                Ok(RunOutcome::Created)
            }
            InsertOutcome::AlreadyExists => {
                info!(%date, "Briefing already stored by a concurrent run");
                Ok(RunOutcome::AlreadyExists)
            }
        }
    }
}

/// Scheduled-trigger entry point: retry-wrapped run whose final failure is
/// observable only through logs. Once started the run is not cancelable;
/// callers that stop awaiting simply stop watching it.
pub async fn run_scheduled(pipeline: &BriefingPipeline, config: RetryConfig) {
    match with_retry(config, || pipeline.run()).await {
        Ok(RunOutcome::Created) => info!("Scheduled briefing run complete"),
        Ok(RunOutcome::AlreadyExists) => info!("Scheduled briefing run was a no-op"),
        Err(e) => error!(error = %e, "All retry attempts failed for scheduled briefing"),
    }
}
