//! Clients for the three independent feeds the daily briefing draws from.
//!
//! Each client either returns its full normalized list or fails with a
//! network/parse error. Skipping a single malformed entry is fine; a
//! terminal failure of the whole call always propagates, never an empty
//! list standing in for one.

pub mod arxiv;
pub mod github;
pub mod hackernews;

pub use arxiv::{ArxivClient, Paper};
pub use github::{GitHubReleases, Release};
pub use hackernews::{DiscussionItem, HackerNewsClient};
