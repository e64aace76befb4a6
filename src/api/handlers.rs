use super::error::ApiResult;
use super::AppState;
use crate::aggregate::sentiment_counts;
use crate::analyzer::AnalysisReport;
use crate::models::{AnalysisRun, Comment, Draft, SentimentCounts};
use crate::store::DASHBOARD_COMMENT_LIMIT;
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Dashboard view of a draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftAnalysisView {
    pub sentiment_counts: SentimentCounts,
    pub comments: Vec<Comment>,
    pub last_run: Option<AnalysisRun>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_drafts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Draft>>> {
    let drafts = state.analyzer.store().list_drafts().await?;
    Ok(Json(drafts))
}

pub async fn analyze_draft(
    State(state): State<Arc<AppState>>,
    draft_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<AnalysisReport>> {
    let Path(draft_id) = draft_id?;
    let report = state.analyzer.analyze_draft(draft_id).await?;
    Ok(Json(report))
}

pub async fn draft_analysis(
    State(state): State<Arc<AppState>>,
    draft_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<DraftAnalysisView>> {
    let Path(draft_id) = draft_id?;
    let store = state.analyzer.store();
    let mut comments = store
        .comments_for_draft(draft_id, Some(DASHBOARD_COMMENT_LIMIT))
        .await?;
    let last_run = store.latest_run(draft_id).await?;

    let counts = sentiment_counts(&comments);
    for comment in &mut comments {
        comment.gemini_response = None;
    }

    Ok(Json(DraftAnalysisView {
        sentiment_counts: counts,
        comments,
        last_run,
    }))
}
