//! The daily briefing pipeline: fetch the three sources concurrently,
//! synthesize one briefing, persist it at most once per calendar day.

pub mod briefing;
pub mod retry;
pub mod synthesizer;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;

pub use briefing::{run_scheduled, BriefingPipeline, RunOutcome};
pub use retry::{with_retry, RetryConfig};
pub use synthesizer::{Synthesis, SynthesisError, Synthesizer};
