//! Store-facing types. Serialized JSON uses camelCase, matching the public
//! wire format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use pulse_common::BriefingResult;

/// A persisted daily briefing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefingRecord {
    pub date: NaiveDate,
    /// Raw normalized source items captured at collection time. Opaque:
    /// kept for audit, never re-parsed by the read path.
    pub sources_snapshot: serde_json::Value,
    pub briefing: BriefingResult,
    pub model: String,
    pub tokens_used: i64,
    pub created_at: DateTime<Utc>,
}

/// A briefing to insert. `created_at` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewBriefing {
    pub date: NaiveDate,
    pub sources_snapshot: serde_json::Value,
    pub briefing: BriefingResult,
    pub model: String,
    pub tokens_used: i64,
}

/// Result of an insert attempt against the per-day uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Read-time projection for history listings. Counts are derived from the
/// stored briefing payload, not from denormalized columns.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefingSummary {
    pub date: NaiveDate,
    pub headline: String,
    pub trend: String,
    pub story_count: usize,
    pub paper_count: usize,
}

impl BriefingSummary {
    pub fn from_briefing(date: NaiveDate, briefing: &BriefingResult) -> Self {
        Self {
            date,
            headline: briefing.headline.clone(),
            trend: briefing.trend.clone(),
            story_count: briefing.stories.len(),
            paper_count: briefing.papers.len(),
        }
    }
}
