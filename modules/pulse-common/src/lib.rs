pub mod config;
pub mod types;

pub use config::Config;
pub use types::{BriefingResult, PaperItem, ReleaseItem, SourceKind, StoryItem};
