//! Briefing persistence: one row per calendar day, created once, never
//! updated or deleted. Postgres-backed, with an in-memory implementation
//! for tests.

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod store;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryBriefingStore;
pub use store::{ensure_schema, BriefingStore, PgBriefingStore};
pub use types::{BriefingRecord, BriefingSummary, InsertOutcome, NewBriefing};
