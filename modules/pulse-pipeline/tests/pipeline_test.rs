//! Pipeline orchestration tests: idempotency, failure propagation, the
//! check-then-insert race, and the retry wrapper around the scheduled path.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};

use pulse_pipeline::testing::{
    discussion_item, test_briefing, test_paper, test_release, MockDiscussions, MockPapers,
    MockReleases, MockSynthesizer,
};
use pulse_pipeline::{with_retry, BriefingPipeline, RetryConfig, RunOutcome};
use pulse_store::{BriefingRecord, MemoryBriefingStore};

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn record_for(day: &str) -> BriefingRecord {
    BriefingRecord {
        date: date(day),
        sources_snapshot: serde_json::json!({}),
        briefing: test_briefing("Existing"),
        model: "test-model".to_string(),
        tokens_used: 10,
        created_at: Utc::now(),
    }
}

fn pipeline(
    discussions: Arc<MockDiscussions>,
    synthesizer: Arc<MockSynthesizer>,
    store: Arc<MemoryBriefingStore>,
) -> BriefingPipeline {
    BriefingPipeline::new(
        discussions,
        Arc::new(MockPapers::returning(vec![test_paper("Sparse Attention")])),
        Arc::new(MockReleases::returning(vec![test_release(
            "acme/widget",
            "v1.0.0",
        )])),
        synthesizer,
        store,
        "test-model",
    )
}

#[tokio::test]
async fn run_stores_one_briefing() {
    let store = Arc::new(MemoryBriefingStore::new());
    let discussions = Arc::new(MockDiscussions::returning(vec![discussion_item(
        1,
        "LLM news",
    )]));
    let synthesizer = Arc::new(MockSynthesizer::returning(test_briefing("Fresh")));
    let p = pipeline(discussions, synthesizer.clone(), store.clone());

    let outcome = p.run_for(date("2024-03-01")).await.unwrap();
    assert_eq!(outcome, RunOutcome::Created);
    assert_eq!(store.record_count(), 1);
    assert!(store.has_record_for(date("2024-03-01")));
    assert_eq!(synthesizer.calls(), 1);
}

#[tokio::test]
async fn second_run_for_same_date_is_a_no_op() {
    let store = Arc::new(MemoryBriefingStore::new());
    let discussions = Arc::new(MockDiscussions::empty());
    let synthesizer = Arc::new(MockSynthesizer::returning(test_briefing("Fresh")));
    let p = pipeline(discussions.clone(), synthesizer.clone(), store.clone());

    assert_eq!(p.run_for(date("2024-03-01")).await.unwrap(), RunOutcome::Created);
    assert_eq!(
        p.run_for(date("2024-03-01")).await.unwrap(),
        RunOutcome::AlreadyExists
    );

    // The pre-check short-circuits before any fetch or synthesis.
    assert_eq!(store.record_count(), 1);
    assert_eq!(discussions.calls(), 1);
    assert_eq!(synthesizer.calls(), 1);
}

#[tokio::test]
async fn pre_existing_record_skips_all_work() {
    let store = Arc::new(MemoryBriefingStore::new().with_record(record_for("2024-03-01")));
    let discussions = Arc::new(MockDiscussions::empty());
    let synthesizer = Arc::new(MockSynthesizer::returning(test_briefing("Fresh")));
    let p = pipeline(discussions.clone(), synthesizer.clone(), store.clone());

    let outcome = p.run_for(date("2024-03-01")).await.unwrap();
    assert_eq!(outcome, RunOutcome::AlreadyExists);
    assert_eq!(discussions.calls(), 0);
    assert_eq!(synthesizer.calls(), 0);
}

#[tokio::test]
async fn losing_the_insert_race_is_benign() {
    // The pre-check sees nothing, but the insert reports a conflict: a
    // concurrent run persisted first. That is a success, not an error.
    let store = Arc::new(MemoryBriefingStore::new().conflict_on_next_insert());
    let discussions = Arc::new(MockDiscussions::empty());
    let synthesizer = Arc::new(MockSynthesizer::returning(test_briefing("Fresh")));
    let p = pipeline(discussions, synthesizer, store.clone());

    let outcome = p.run_for(date("2024-03-01")).await.unwrap();
    assert_eq!(outcome, RunOutcome::AlreadyExists);
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn source_failure_aborts_before_synthesis() {
    let store = Arc::new(MemoryBriefingStore::new());
    let discussions = Arc::new(MockDiscussions::empty().failing_times(1));
    let synthesizer = Arc::new(MockSynthesizer::returning(test_briefing("Fresh")));
    let p = pipeline(discussions, synthesizer.clone(), store.clone());

    let err = p.run_for(date("2024-03-01")).await.unwrap_err();
    assert!(err.to_string().contains("discussion feed fetch failed"));
    assert_eq!(synthesizer.calls(), 0);
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn synthesis_failure_stores_nothing() {
    let store = Arc::new(MemoryBriefingStore::new());
    let discussions = Arc::new(MockDiscussions::empty());
    let synthesizer = Arc::new(MockSynthesizer::failing());
    let p = pipeline(discussions, synthesizer, store.clone());

    let err = p.run_for(date("2024-03-01")).await.unwrap_err();
    assert!(err.to_string().contains("briefing synthesis failed"));
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn empty_feeds_are_valid_input() {
    // Zero items from every source is not a fetch failure; the run proceeds
    // to synthesis and persists normally.
    let store = Arc::new(MemoryBriefingStore::new());
    let p = BriefingPipeline::new(
        Arc::new(MockDiscussions::empty()),
        Arc::new(MockPapers::empty()),
        Arc::new(MockReleases::empty()),
        Arc::new(MockSynthesizer::returning(test_briefing("Quiet"))),
        store.clone(),
        "test-model",
    );

    assert_eq!(p.run_for(date("2024-03-01")).await.unwrap(), RunOutcome::Created);
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn retry_recovers_from_transient_source_failures() {
    let store = Arc::new(MemoryBriefingStore::new());
    let discussions = Arc::new(MockDiscussions::empty().failing_times(2));
    let synthesizer = Arc::new(MockSynthesizer::returning(test_briefing("Fresh")));
    let p = pipeline(discussions.clone(), synthesizer, store.clone());

    let config = RetryConfig {
        attempts: 3,
        base_delay: Duration::from_millis(5),
    };
    let outcome = with_retry(config, || p.run_for(date("2024-03-01")))
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::Created);
    assert_eq!(discussions.calls(), 3);
    assert_eq!(store.record_count(), 1);
}

#[tokio::test]
async fn retry_budget_exhaustion_leaves_no_record() {
    let store = Arc::new(MemoryBriefingStore::new());
    let discussions = Arc::new(MockDiscussions::empty().failing_times(2));
    let synthesizer = Arc::new(MockSynthesizer::returning(test_briefing("Fresh")));
    let p = pipeline(discussions.clone(), synthesizer, store.clone());

    let config = RetryConfig {
        attempts: 2,
        base_delay: Duration::from_millis(5),
    };
    let result = with_retry(config, || p.run_for(date("2024-03-01"))).await;

    assert!(result.is_err());
    assert_eq!(discussions.calls(), 2);
    assert_eq!(store.record_count(), 0);
}

#[tokio::test]
async fn no_op_run_does_not_trigger_retries() {
    let store = Arc::new(MemoryBriefingStore::new().with_record(record_for("2024-03-01")));
    let discussions = Arc::new(MockDiscussions::empty());
    let synthesizer = Arc::new(MockSynthesizer::returning(test_briefing("Fresh")));
    let p = pipeline(discussions.clone(), synthesizer, store.clone());

    let config = RetryConfig {
        attempts: 3,
        base_delay: Duration::from_millis(5),
    };
    let outcome = with_retry(config, || p.run_for(date("2024-03-01")))
        .await
        .unwrap();

    assert_eq!(outcome, RunOutcome::AlreadyExists);
    assert_eq!(discussions.calls(), 0);
}
