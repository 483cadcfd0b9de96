//! BriefingStore trait and the Postgres implementation.
//!
//! The per-day uniqueness constraint is the source of correctness for
//! "at most one briefing per day". Callers may pre-check as a cheap
//! short-circuit, but the insert itself rejects duplicates.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::warn;

use pulse_common::BriefingResult;

use crate::types::{BriefingRecord, BriefingSummary, InsertOutcome, NewBriefing};

#[async_trait]
pub trait BriefingStore: Send + Sync {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<BriefingRecord>>;

    /// The briefing with the most recent date, if any.
    async fn find_latest(&self) -> Result<Option<BriefingRecord>>;

    /// Summaries for all briefings on or after `since`, most recent first.
    async fn find_range(&self, since: NaiveDate) -> Result<Vec<BriefingSummary>>;

    /// Insert unless a row for the same date already exists.
    async fn insert_if_absent(&self, briefing: &NewBriefing) -> Result<InsertOutcome>;
}

/// Create the briefing table if it does not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS daily_briefings (
            date             DATE         PRIMARY KEY,
            sources_snapshot JSONB        NOT NULL,
            briefing         JSONB        NOT NULL,
            model            TEXT         NOT NULL,
            tokens_used      BIGINT       NOT NULL,
            created_at       TIMESTAMPTZ  NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Postgres-backed briefing store.
#[derive(Clone)]
pub struct PgBriefingStore {
    pool: PgPool,
}

type BriefingRow = (
    NaiveDate,
    serde_json::Value,
    serde_json::Value,
    String,
    i64,
    DateTime<Utc>,
);

impl PgBriefingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: BriefingRow) -> Result<BriefingRecord> {
        let (date, sources_snapshot, briefing, model, tokens_used, created_at) = row;
        let briefing: BriefingResult = serde_json::from_value(briefing)?;
        Ok(BriefingRecord {
            date,
            sources_snapshot,
            briefing,
            model,
            tokens_used,
            created_at,
        })
    }
}

#[async_trait]
impl BriefingStore for PgBriefingStore {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<BriefingRecord>> {
        let row = sqlx::query_as::<_, BriefingRow>(
            r#"
            SELECT date, sources_snapshot, briefing, model, tokens_used, created_at
            FROM daily_briefings
            WHERE date = $1
            "#,
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::record_from_row).transpose()
    }

    async fn find_latest(&self) -> Result<Option<BriefingRecord>> {
        let row = sqlx::query_as::<_, BriefingRow>(
            r#"
            SELECT date, sources_snapshot, briefing, model, tokens_used, created_at
            FROM daily_briefings
            ORDER BY date DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::record_from_row).transpose()
    }

    async fn find_range(&self, since: NaiveDate) -> Result<Vec<BriefingSummary>> {
        let rows = sqlx::query_as::<_, (NaiveDate, serde_json::Value)>(
            r#"
            SELECT date, briefing
            FROM daily_briefings
            WHERE date >= $1
            ORDER BY date DESC
            "#,
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let mut summaries = Vec::with_capacity(rows.len());
        for (date, value) in rows {
            match serde_json::from_value::<BriefingResult>(value) {
                Ok(briefing) => summaries.push(BriefingSummary::from_briefing(date, &briefing)),
                Err(e) => {
                    warn!(%date, error = %e, "Skipping briefing row with undecodable payload")
                }
            }
        }
        Ok(summaries)
    }

    async fn insert_if_absent(&self, briefing: &NewBriefing) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_briefings (date, sources_snapshot, briefing, model, tokens_used)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (date) DO NOTHING
            "#,
        )
        .bind(briefing.date)
        .bind(&briefing.sources_snapshot)
        .bind(serde_json::to_value(&briefing.briefing)?)
        .bind(&briefing.model)
        .bind(briefing.tokens_used)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }
}
