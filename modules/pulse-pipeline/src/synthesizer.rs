//! Builds the briefing prompt, makes exactly one completion call, and
//! validates the structured response. Any decode or validation failure is
//! fatal for the whole run: no partial briefing is ever produced.

use thiserror::Error;
use tracing::debug;

use openrouter_client::types::{ChatRequest, WireMessage};
use openrouter_client::util::{strip_code_fences, truncate_to_char_boundary};
use openrouter_client::OpenRouterClient;
use pulse_common::BriefingResult;
use pulse_sources::{DiscussionItem, Paper, Release};

/// Byte budget for each rendered abstract in the prompt.
const ABSTRACT_BUDGET: usize = 200;
/// Author names rendered before collapsing to "et al.".
const AUTHOR_LIMIT: usize = 3;
const MAX_COMPLETION_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str = "You are an expert AI industry analyst. Produce a concise daily \
briefing synthesizing AI news from Hacker News, arXiv papers, and GitHub releases. Be insightful \
and opinionated. Focus on what matters to AI practitioners and engineers.";

#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The completion endpoint itself failed (non-success status, transport).
    #[error(transparent)]
    Endpoint(#[from] openrouter_client::Error),

    /// The model's reply is not valid JSON at all.
    #[error("model output is not valid JSON: {0}")]
    Decode(String),

    /// The reply is valid JSON but does not match the briefing shape.
    #[error("model output failed validation: {0}")]
    Invalid(String),
}

/// A validated briefing plus the token cost of producing it.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub briefing: BriefingResult,
    pub tokens_used: i64,
}

pub struct Synthesizer {
    client: OpenRouterClient,
    model: String,
}

impl Synthesizer {
    pub fn new(client: OpenRouterClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn synthesize(
        &self,
        stories: &[DiscussionItem],
        papers: &[Paper],
        releases: &[Release],
    ) -> Result<Synthesis, SynthesisError> {
        let prompt = build_prompt(stories, papers, releases);

        let request = ChatRequest::new(&self.model)
            .message(WireMessage::system(SYSTEM_PROMPT))
            .message(WireMessage::user(prompt))
            .max_tokens(MAX_COMPLETION_TOKENS);

        let response = self.client.chat(&request).await?;
        let tokens_used = response.tokens_used();

        debug!(tokens_used, "Briefing synthesis response received");

        let briefing = decode_briefing(response.text().unwrap_or_default())?;
        Ok(Synthesis {
            briefing,
            tokens_used,
        })
    }
}

fn build_prompt(stories: &[DiscussionItem], papers: &[Paper], releases: &[Release]) -> String {
    let story_lines = if stories.is_empty() {
        "- No AI stories trending today".to_string()
    } else {
        stories
            .iter()
            .map(|s| format!("- [HN {}pts] {} ({})", s.score, s.title, s.url))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let paper_lines = if papers.is_empty() {
        "- No new papers".to_string()
    } else {
        papers.iter().map(render_paper).collect::<Vec<_>>().join("\n")
    };

    let release_lines = if releases.is_empty() {
        "- No major releases in the past 48 hours".to_string()
    } else {
        releases
            .iter()
            .map(|r| format!("- [Release] {} {}: {}", r.repo, r.tag, r.title))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"Here are today's AI/ML sources:

## Hacker News (AI-filtered)
{story_lines}

## arXiv Papers (cs.AI + cs.LG)
{paper_lines}

## GitHub Releases
{release_lines}

Synthesize these into a daily briefing. Output ONLY valid JSON (no markdown, no code fences):

{{
  "headline": "One sentence capturing today's biggest AI story or theme",
  "stories": [
    {{ "title": "Story title", "source": "hackernews|arxiv|github", "url": "url", "summary": "One-line insight", "significance": 1-5 }}
  ],
  "papers": [
    {{ "title": "Paper title", "authors": "First Author et al.", "summary": "Plain-English 2-sentence explanation of what this paper does and why it matters", "url": "arxiv url" }}
  ],
  "releases": [
    {{ "repo": "owner/name", "version": "v1.0.0", "summary": "What changed and why it matters", "url": "url" }}
  ],
  "trend": "2-3 sentences on the emerging theme across today's sources"
}}

Rules:
- stories: pick the top 5-8 most significant items across all sources
- papers: pick the top 3 most noteworthy papers, explain in plain English
- releases: include all from the input, summarize each
- If a section has no data, use an empty array
- significance is 1-5 (5 = most significant)
- Be direct and opinionated"#
    )
}

fn render_paper(paper: &Paper) -> String {
    let authors = render_authors(&paper.authors);
    let truncated = truncate_to_char_boundary(&paper.abstract_text, ABSTRACT_BUDGET);
    let ellipsis = if truncated.len() < paper.abstract_text.len() {
        "..."
    } else {
        ""
    };
    format!(
        "- [arXiv] {} by {}: {}{}",
        paper.title, authors, truncated, ellipsis
    )
}

fn render_authors(authors: &[String]) -> String {
    let mut rendered = authors
        .iter()
        .take(AUTHOR_LIMIT)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");
    if authors.len() > AUTHOR_LIMIT {
        rendered.push_str(" et al.");
    }
    rendered
}

/// Decode the model's reply into a validated BriefingResult. Distinguishes
/// "not JSON" from "JSON with the wrong shape" so callers can log precisely.
fn decode_briefing(text: &str) -> Result<BriefingResult, SynthesisError> {
    let cleaned = strip_code_fences(text);

    let value: serde_json::Value =
        serde_json::from_str(cleaned).map_err(|e| SynthesisError::Decode(e.to_string()))?;

    let briefing: BriefingResult =
        serde_json::from_value(value).map_err(|e| SynthesisError::Invalid(e.to_string()))?;

    briefing.validate().map_err(SynthesisError::Invalid)?;

    Ok(briefing)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_REPLY: &str = r#"{
        "headline": "Open models close the gap",
        "stories": [
            {"title": "A story", "source": "hackernews", "url": "https://example.com", "summary": "s", "significance": 4}
        ],
        "papers": [],
        "releases": [],
        "trend": "Everything is getting smaller and faster."
    }"#;

    fn story(title: &str, score: u32) -> DiscussionItem {
        DiscussionItem {
            id: 1,
            title: title.to_string(),
            url: "https://example.com/story".to_string(),
            score,
            author: "someone".to_string(),
            time: 1_700_000_000,
            comment_count: 12,
        }
    }

    fn paper(title: &str, authors: &[&str], abstract_text: &str) -> Paper {
        Paper {
            title: title.to_string(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
            abstract_text: abstract_text.to_string(),
            url: "https://arxiv.org/abs/0000.0000".to_string(),
            published: None,
        }
    }

    #[test]
    fn decodes_a_plain_json_reply() {
        let briefing = decode_briefing(VALID_REPLY).unwrap();
        assert_eq!(briefing.headline, "Open models close the gap");
        assert_eq!(briefing.stories.len(), 1);
    }

    #[test]
    fn decodes_a_fenced_reply() {
        let fenced = format!("```json\n{VALID_REPLY}\n```");
        assert!(decode_briefing(&fenced).is_ok());
    }

    #[test]
    fn garbage_is_a_decode_error() {
        match decode_briefing("I'm sorry, I can't produce JSON today.") {
            Err(SynthesisError::Decode(_)) => {}
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn missing_stories_is_schema_invalid() {
        let reply = r#"{"headline": "h", "papers": [], "releases": [], "trend": "t"}"#;
        match decode_briefing(reply) {
            Err(SynthesisError::Invalid(_)) => {}
            other => panic!("expected Invalid error, got {other:?}"),
        }
    }

    #[test]
    fn out_of_range_significance_is_schema_invalid() {
        let reply = r#"{
            "headline": "h",
            "stories": [{"title": "t", "source": "github", "url": "u", "summary": "s", "significance": 6}],
            "papers": [],
            "releases": [],
            "trend": "t"
        }"#;
        match decode_briefing(reply) {
            Err(SynthesisError::Invalid(msg)) => assert!(msg.contains("significance")),
            other => panic!("expected Invalid error, got {other:?}"),
        }
    }

    #[test]
    fn prompt_renders_all_three_sections() {
        let prompt = build_prompt(
            &[story("LLM beats benchmark", 321)],
            &[paper("Sparse Attention", &["A", "B"], "Short abstract.")],
            &[Release {
                repo: "acme/widget".to_string(),
                tag: "v1.2.3".to_string(),
                title: "Widget 1.2.3".to_string(),
            }],
        );
        assert!(prompt.contains("- [HN 321pts] LLM beats benchmark (https://example.com/story)"));
        assert!(prompt.contains("- [arXiv] Sparse Attention by A, B: Short abstract."));
        assert!(prompt.contains("- [Release] acme/widget v1.2.3: Widget 1.2.3"));
    }

    #[test]
    fn prompt_marks_empty_sections() {
        let prompt = build_prompt(&[], &[], &[]);
        assert!(prompt.contains("- No AI stories trending today"));
        assert!(prompt.contains("- No new papers"));
        assert!(prompt.contains("- No major releases in the past 48 hours"));
    }

    #[test]
    fn long_author_lists_collapse_to_et_al() {
        let p = paper("P", &["A", "B", "C", "D", "E"], "abstract");
        let line = render_paper(&p);
        assert!(line.contains("A, B, C et al."));
        assert!(!line.contains("D"));
    }

    #[test]
    fn long_abstracts_are_truncated_with_ellipsis() {
        let long = "x".repeat(500);
        let p = paper("P", &["A"], &long);
        let line = render_paper(&p);
        assert!(line.len() < 300);
        assert!(line.ends_with("..."));
    }
}
