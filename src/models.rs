//! Records shared by the store, the analysis pipeline and the HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Sentiment label assigned to a comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }

    /// Case-insensitive label lookup; `None` for anything outside the three labels
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Histogram of sentiment labels
pub type SentimentCounts = BTreeMap<Sentiment, usize>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Draft {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Section {
    pub id: i64,
    pub draft_id: i64,
    pub section_code: String,
    pub section_title: Option<String>,
}

/// A consultation comment with its analysis state.
///
/// `sentiment` and `confidence` only carry meaning once `analyzed_at` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub draft_id: i64,
    pub section_id: Option<i64>,
    pub section_code: Option<String>,
    pub section_title: Option<String>,
    pub comment_text: String,
    pub stakeholder_type: Option<String>,
    pub sentiment: Option<Sentiment>,
    pub confidence: Option<f64>,
    pub analyzed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini_response: Option<Value>,
}

impl Comment {
    pub fn is_analyzed(&self) -> bool {
        self.analyzed_at.is_some()
    }

    /// Sentiment used for counting and sampling; unset counts as Neutral
    pub fn effective_sentiment(&self) -> Sentiment {
        self.sentiment.unwrap_or(Sentiment::Neutral)
    }
}

/// Comment payload accepted by the store when loading data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewComment {
    pub draft_id: i64,
    #[serde(default)]
    pub section_id: Option<i64>,
    pub comment_text: String,
    #[serde(default)]
    pub stakeholder_type: Option<String>,
}

/// Sentiment verdict for one comment, as read back from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub id: i64,
    pub sentiment: Sentiment,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub word: String,
    pub count: usize,
}

/// Draft-level summary returned by the overall prompt
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverallSummary {
    pub draft_summary: String,
    pub top_themes: Vec<String>,
    pub priority_recommendation: String,
    pub stakeholder_suggestions: Value,
}

/// One persisted aggregate snapshot for a draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRun {
    pub id: i64,
    pub draft_id: i64,
    pub total_comments: usize,
    pub sentiment_counts: SentimentCounts,
    pub top_keywords: Vec<Keyword>,
    pub draft_summary: String,
    pub top_themes: Vec<String>,
    pub priority_recommendation: String,
    pub stakeholder_suggestions: Value,
    pub gemini_response: Value,
    pub run_at: DateTime<Utc>,
}

/// Run payload before the store assigns id and timestamp
#[derive(Debug, Clone)]
pub struct NewAnalysisRun {
    pub draft_id: i64,
    pub total_comments: usize,
    pub sentiment_counts: SentimentCounts,
    pub top_keywords: Vec<Keyword>,
    pub summary: OverallSummary,
    pub gemini_response: Value,
}
