//! The briefing shape produced by synthesis. Created once per day, never
//! mutated afterwards. Validation rejects out-of-range values instead of
//! correcting them.

use serde::{Deserialize, Serialize};

/// Hard limit on synthesized stories per briefing.
pub const MAX_STORIES: usize = 8;
/// Hard limit on highlighted papers per briefing.
pub const MAX_PAPERS: usize = 3;
const MIN_SIGNIFICANCE: i64 = 1;
const MAX_SIGNIFICANCE: i64 = 5;

/// Which feed a synthesized story was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Hackernews,
    Arxiv,
    Github,
}

/// One synthesized story with the model's significance rating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryItem {
    pub title: String,
    pub source: SourceKind,
    pub url: String,
    pub summary: String,
    pub significance: i64,
}

/// A highlighted research paper. `authors` is the model's rendered string
/// (e.g. "First Author et al."), not the raw author list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperItem {
    pub title: String,
    pub authors: String,
    pub summary: String,
    pub url: String,
}

/// A summarized release event, mirroring the release feed input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseItem {
    pub repo: String,
    pub version: String,
    pub summary: String,
    pub url: String,
}

/// The synthesized daily briefing. All array fields are required: an empty
/// section is an empty array, never a missing field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingResult {
    pub headline: String,
    pub stories: Vec<StoryItem>,
    pub papers: Vec<PaperItem>,
    pub releases: Vec<ReleaseItem>,
    pub trend: String,
}

impl BriefingResult {
    /// Check the shape invariants the model is instructed to honor.
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        if self.headline.trim().is_empty() {
            return Err("headline must not be empty".to_string());
        }
        if self.stories.len() > MAX_STORIES {
            return Err(format!(
                "too many stories: {} (max {MAX_STORIES})",
                self.stories.len()
            ));
        }
        for story in &self.stories {
            if story.significance < MIN_SIGNIFICANCE || story.significance > MAX_SIGNIFICANCE {
                return Err(format!(
                    "significance {} out of range [{MIN_SIGNIFICANCE},{MAX_SIGNIFICANCE}] for story '{}'",
                    story.significance, story.title
                ));
            }
        }
        if self.papers.len() > MAX_PAPERS {
            return Err(format!(
                "too many papers: {} (max {MAX_PAPERS})",
                self.papers.len()
            ));
        }
        if self.trend.trim().is_empty() {
            return Err("trend must not be empty".to_string());
        }
        Ok(())
    }
}
