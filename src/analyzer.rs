//! Analysis run for one draft: classify what is new, aggregate, summarize, log the run.

use crate::aggregate::aggregate;
use crate::client::Gateway;
use crate::domains::{ClassificationMode, ClassifiedBatch, CommentClassifier, DraftSummarizer};
use crate::models::*;
use crate::prompt::OverallPromptInput;
use crate::store::Store;
use crate::types::*;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_BATCH_SIZE: usize = 8;
pub const SUMMARY_GATEWAY_ERROR: &str = "Summary unavailable (gateway error).";

/// Response body of a completed analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub status: String,
    pub run_id: i64,
    /// Comments classified during this invocation
    pub classified: usize,
    pub total_comments: usize,
    pub sentiment_counts: SentimentCounts,
    pub top_keywords: Vec<Keyword>,
    pub draft_summary: String,
    pub top_themes: Vec<String>,
    pub priority_recommendation: String,
    pub stakeholder_suggestions: Value,
}

/// Drives the analysis of a draft against a store and a gateway
#[derive(Clone)]
pub struct Analyzer {
    store: Store,
    classifier: Arc<CommentClassifier>,
    summarizer: Arc<DraftSummarizer>,
    mode: ClassificationMode,
    batch_size: usize,
}

impl Analyzer {
    pub fn new(store: Store, gateway: Arc<dyn Gateway>) -> Self {
        Self {
            store,
            classifier: Arc::new(CommentClassifier::new(gateway.clone())),
            summarizer: Arc::new(DraftSummarizer::new(gateway)),
            mode: ClassificationMode::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_mode(mut self, mode: ClassificationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Run the full analysis for `draft_id`.
    ///
    /// Comments already carrying `analyzed_at` are never sent again, but every
    /// call appends a new analysis run.
    pub async fn analyze_draft(&self, draft_id: i64) -> ConsultResult<AnalysisReport> {
        let comments = self.store.comments_for_draft(draft_id, None).await?;
        if comments.is_empty() {
            return Err(ConsultError::NotFound { draft_id });
        }

        let title = match self.store.get_draft(draft_id).await? {
            Some(draft) => draft.title,
            None => draft_id.to_string(),
        };

        info!(draft_id, comments = comments.len(), mode = ?self.mode, "Starting analysis");
        let classified = self.classify_pending(draft_id, &title, &comments).await?;

        let comments = self.store.comments_for_draft(draft_id, None).await?;
        let stats = aggregate(&comments);

        let prompt_input = OverallPromptInput {
            title: &title,
            total_comments: stats.total_comments,
            sentiment_counts: &stats.sentiment_counts,
            top_keywords: &stats.top_keywords,
            sample_comments: &stats.sample_comments,
            stakeholders: Some(&stats.stakeholders),
        };

        let (summary, raw) = match self.summarizer.summarize(&prompt_input).await {
            Ok((summary, response)) => (summary, response.raw),
            Err(e) => {
                warn!(draft_id, error = %e, "Overall summary request failed, storing placeholder");
                let placeholder = OverallSummary {
                    draft_summary: SUMMARY_GATEWAY_ERROR.to_string(),
                    stakeholder_suggestions: Value::Object(Map::new()),
                    ..Default::default()
                };
                (placeholder, json!({ "error": e.to_string() }))
            }
        };

        let run = NewAnalysisRun {
            draft_id,
            total_comments: stats.total_comments,
            sentiment_counts: stats.sentiment_counts.clone(),
            top_keywords: stats.top_keywords.clone(),
            summary: summary.clone(),
            gemini_response: raw,
        };
        let run_id = self.store.insert_run(&run, Utc::now()).await?;

        info!(draft_id, run_id, classified, total = stats.total_comments, "Analysis complete");

        Ok(AnalysisReport {
            status: "ok".to_string(),
            run_id,
            classified,
            total_comments: stats.total_comments,
            sentiment_counts: stats.sentiment_counts,
            top_keywords: stats.top_keywords,
            draft_summary: summary.draft_summary,
            top_themes: summary.top_themes,
            priority_recommendation: summary.priority_recommendation,
            stakeholder_suggestions: summary.stakeholder_suggestions,
        })
    }

    /// Classify every comment without `analyzed_at`; returns how many were stored
    async fn classify_pending(&self, draft_id: i64, title: &str, comments: &[Comment]) -> ConsultResult<usize> {
        let mut stored = 0;

        for chunk in comments.chunks(self.batch_size) {
            let pending: Vec<&Comment> = chunk.iter().filter(|c| !c.is_analyzed()).collect();
            if pending.is_empty() {
                continue;
            }

            match self.mode {
                ClassificationMode::Batch => {
                    let batch = self.classifier.classify_batch(&pending, title).await?;
                    stored += self.persist(draft_id, &pending, batch).await?;
                }
                ClassificationMode::Single => {
                    for comment in &pending {
                        let result = self.classifier.classify_one(comment, title).await?;
                        stored += self.persist(draft_id, std::slice::from_ref(comment), result).await?;
                    }
                }
            }
        }

        Ok(stored)
    }

    /// Write each verdict that belongs to `sent`; anything else the model returned is dropped
    async fn persist(&self, draft_id: i64, sent: &[&Comment], batch: ClassifiedBatch) -> ConsultResult<usize> {
        let expected: HashSet<i64> = sent.iter().map(|c| c.id).collect();
        let raw = json!({ "text": batch.response.text, "raw": batch.response.raw });
        let mut written = HashSet::new();

        for classification in &batch.classifications {
            if !expected.contains(&classification.id) {
                warn!(draft_id, comment_id = classification.id, "Model returned an id outside the batch, ignoring");
                continue;
            }
            if !written.insert(classification.id) {
                continue;
            }
            self.store
                .record_classification(draft_id, classification, &raw, Utc::now())
                .await?;
        }

        if written.len() < expected.len() {
            warn!(
                draft_id,
                missing = expected.len() - written.len(),
                "Model skipped some comments; they stay unanalyzed"
            );
        }

        Ok(written.len())
    }
}
