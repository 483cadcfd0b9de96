//! In-memory BriefingStore for tests. Mirrors the Postgres semantics:
//! duplicate dates are rejected at insert, range reads are date-descending.

use std::collections::BTreeMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::store::BriefingStore;
use crate::types::{BriefingRecord, BriefingSummary, InsertOutcome, NewBriefing};

#[derive(Default)]
struct MemoryInner {
    records: BTreeMap<NaiveDate, BriefingRecord>,
    conflict_next_insert: bool,
    fail_inserts: bool,
}

/// Stateful in-memory store. Thread-safe via interior Mutex.
#[derive(Default)]
pub struct MemoryBriefingStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryBriefingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a record.
    pub fn with_record(self, record: BriefingRecord) -> Self {
        self.inner
            .lock()
            .unwrap()
            .records
            .insert(record.date, record);
        self
    }

    /// Make the next insert report `AlreadyExists` even though the pre-check
    /// saw nothing — simulates losing the check-then-insert race.
    pub fn conflict_on_next_insert(self) -> Self {
        self.inner.lock().unwrap().conflict_next_insert = true;
        self
    }

    /// Make every insert return an error.
    pub fn failing_inserts(self) -> Self {
        self.inner.lock().unwrap().fail_inserts = true;
        self
    }

    // --- Assertion helpers ---

    pub fn record_count(&self) -> usize {
        self.inner.lock().unwrap().records.len()
    }

    pub fn has_record_for(&self, date: NaiveDate) -> bool {
        self.inner.lock().unwrap().records.contains_key(&date)
    }
}

#[async_trait]
impl BriefingStore for MemoryBriefingStore {
    async fn find_by_date(&self, date: NaiveDate) -> Result<Option<BriefingRecord>> {
        Ok(self.inner.lock().unwrap().records.get(&date).cloned())
    }

    async fn find_latest(&self) -> Result<Option<BriefingRecord>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .records
            .values()
            .next_back()
            .cloned())
    }

    async fn find_range(&self, since: NaiveDate) -> Result<Vec<BriefingSummary>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .records
            .range(since..)
            .rev()
            .map(|(date, r)| BriefingSummary::from_briefing(*date, &r.briefing))
            .collect())
    }

    async fn insert_if_absent(&self, briefing: &NewBriefing) -> Result<InsertOutcome> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_inserts {
            bail!("MemoryBriefingStore: insert forced failure");
        }
        if inner.conflict_next_insert {
            inner.conflict_next_insert = false;
            return Ok(InsertOutcome::AlreadyExists);
        }
        if inner.records.contains_key(&briefing.date) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        inner.records.insert(
            briefing.date,
            BriefingRecord {
                date: briefing.date,
                sources_snapshot: briefing.sources_snapshot.clone(),
                briefing: briefing.briefing.clone(),
                model: briefing.model.clone(),
                tokens_used: briefing.tokens_used,
                created_at: Utc::now(),
            },
        );
        Ok(InsertOutcome::Inserted)
    }
}
