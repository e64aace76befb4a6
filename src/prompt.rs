//! Prompt construction for comment classification and draft summaries.
//!
//! Every builder here is a pure function of its input.

use crate::models::{Comment, Keyword, SentimentCounts};
use crate::utils::{collapse_newlines, truncate_chars};
use serde::Serialize;

/// Character budget per comment in a batch prompt
pub const BATCH_COMMENT_CHARS: usize = 800;
/// Character budget for the comment in a single-comment prompt
pub const SINGLE_COMMENT_CHARS: usize = 1800;
/// Keywords listed in the overall prompt
pub const OVERALL_KEYWORDS: usize = 12;
/// Sample excerpts listed in the overall prompt
pub const OVERALL_SAMPLES: usize = 12;
/// Character budget per excerpt in the overall prompt
pub const OVERALL_EXCERPT_CHARS: usize = 600;

/// Comment text as it may appear inside a quoted prompt line
pub fn sanitize_comment(text: &str, max_chars: usize) -> String {
    let escaped = collapse_newlines(text).replace('"', "\\\"");
    truncate_chars(&escaped, max_chars)
}

/// Prompt asking for one `{id, sentiment, confidence}` entry per comment
pub fn build_batch_prompt(comments: &[&Comment], draft_title: &str) -> String {
    let lines = comments
        .iter()
        .enumerate()
        .map(|(i, c)| {
            format!(
                "{}) ID:{} \"{}\"",
                i + 1,
                c.id,
                sanitize_comment(&c.comment_text, BATCH_COMMENT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an assistant that classifies public consultation comments relative to a policy draft.

DRAFT_TITLE: \"{title}\"

COMMENTS:
{lines}

Task: For each comment, return ONLY a JSON array with exactly one object per comment, like this:
[
  {{\"id\": <commentId>, \"sentiment\":\"Positive\" | \"Neutral\" | \"Negative\", \"confidence\":0.00}}
]
confidence is a number between 0 and 1 with two decimals.",
        title = draft_title,
        lines = lines,
    )
}

/// Prompt asking for a single `{id, sentiment, confidence}` object
pub fn build_single_prompt(comment: &Comment, draft_title: &str) -> String {
    format!(
        "You are an assistant that classifies a public consultation comment relative to a policy draft.

DRAFT_TITLE: \"{title}\"

COMMENT:
ID:{id} \"{text}\"

Task: Return ONLY a JSON object like this:
{{\"id\": {id}, \"sentiment\":\"Positive\" | \"Neutral\" | \"Negative\", \"confidence\":0.00}}
confidence is a number between 0 and 1 with two decimals.",
        title = draft_title,
        id = comment.id,
        text = sanitize_comment(&comment.comment_text, SINGLE_COMMENT_CHARS),
    )
}

/// Comment excerpts grouped by stakeholder category
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StakeholderExcerpts {
    pub citizens: Vec<String>,
    pub government: Vec<String>,
}

impl StakeholderExcerpts {
    pub fn is_empty(&self) -> bool {
        self.citizens.is_empty() && self.government.is_empty()
    }
}

/// Aggregate statistics fed to the overall prompt
#[derive(Debug, Clone)]
pub struct OverallPromptInput<'a> {
    pub title: &'a str,
    pub total_comments: usize,
    pub sentiment_counts: &'a SentimentCounts,
    pub top_keywords: &'a [Keyword],
    pub sample_comments: &'a [String],
    pub stakeholders: Option<&'a StakeholderExcerpts>,
}

/// Prompt asking for the draft-level summary object
pub fn build_overall_prompt(input: &OverallPromptInput<'_>) -> String {
    let counts = serde_json::to_string(input.sentiment_counts).unwrap_or_else(|_| "{}".to_string());

    let phrases = input
        .top_keywords
        .iter()
        .take(OVERALL_KEYWORDS)
        .map(|k| k.word.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let samples = input
        .sample_comments
        .iter()
        .take(OVERALL_SAMPLES)
        .enumerate()
        .map(|(i, s)| format!("{}) {}", i + 1, truncate_chars(&collapse_newlines(s), OVERALL_EXCERPT_CHARS)))
        .collect::<Vec<_>>()
        .join("\n");

    let stakeholders = match input.stakeholders {
        Some(excerpts) if !excerpts.is_empty() => {
            let trimmed = StakeholderExcerpts {
                citizens: trim_excerpts(&excerpts.citizens),
                government: trim_excerpts(&excerpts.government),
            };
            format!(
                "STAKEHOLDER_COMMENTS: {}\n",
                serde_json::to_string(&trimmed).unwrap_or_else(|_| "{}".to_string())
            )
        }
        _ => String::new(),
    };

    format!(
        "You are an expert policy analyst.

DRAFT_TITLE: {title}
TOTAL_COMMENTS: {total}
SENTIMENT_COUNTS: {counts}
TOP_PHRASES: {phrases}
{stakeholders}
SAMPLE_COMMENTS:
{samples}

Task:
1) Give overall sentiment (positive / mixed / negative).
2) Identify top 2 themes requiring attention.
3) Provide one clear recommendation for officials.
4) Suggest at least one perspective from citizens and one from government stakeholders.

Return ONLY JSON:
{{
  \"draft_summary\":\"...\",
  \"top_themes\":[\"...\"],
  \"priority_recommendation\":\"...\",
  \"stakeholder_suggestions\": {{
     \"citizens\": [\"...\"],
     \"government\": [\"...\"]
  }}
}}",
        title = input.title,
        total = input.total_comments,
        counts = counts,
        phrases = phrases,
        stakeholders = stakeholders,
        samples = samples,
    )
}

fn trim_excerpts(excerpts: &[String]) -> Vec<String> {
    excerpts
        .iter()
        .map(|e| truncate_chars(&collapse_newlines(e), OVERALL_EXCERPT_CHARS))
        .collect()
}
