mod test_helpers;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use econsult::api::{self, AppState, DraftAnalysisView};
use econsult::{AnalysisReport, Analyzer, ConsultError, Sentiment, Store};
use serde_json::Value;
use std::sync::Arc;
use test_helpers::{sample_comments, seeded_store, RecordingGateway};
use tower::ServiceExt;

fn app_for(store: Store, gateway: Arc<RecordingGateway>) -> Router {
    api::router(Arc::new(AppState::new(Analyzer::new(store, gateway))))
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

#[tokio::test]
async fn test_health() {
    let (store, _) = seeded_store("Bill", &[]).await;
    let (status, body) = send(app_for(store, Arc::new(RecordingGateway::new())), "GET", "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_list_drafts() {
    let (store, first) = seeded_store("First draft", &[]).await;
    let second = store.create_draft("Second draft").await.unwrap();
    let (status, body) = send(app_for(store, Arc::new(RecordingGateway::new())), "GET", "/api/drafts").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json[0]["id"], first);
    assert_eq!(json[0]["title"], "First draft");
    assert_eq!(json[1]["id"], second);
}

#[tokio::test]
async fn test_analyze_unknown_draft_is_404() {
    let (store, draft_id) = seeded_store("Empty", &[]).await;
    let gateway = Arc::new(RecordingGateway::new());
    let uri = format!("/api/analyze/{}", draft_id);
    let (status, body) = send(app_for(store, gateway.clone()), "POST", &uri).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "No comments found for this draft");
    assert!(gateway.prompts().is_empty());
}

#[tokio::test]
async fn test_analyze_returns_report() {
    let (store, draft_id) = seeded_store("Bill", &sample_comments()).await;
    let uri = format!("/api/analyze/{}", draft_id);
    let (status, body) = send(app_for(store.clone(), Arc::new(RecordingGateway::new())), "POST", &uri).await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sentiment_counts"]["Positive"], 4);
    assert!(json["top_keywords"].is_array());
    assert!(json["draft_summary"].is_string());

    let report: AnalysisReport = serde_json::from_value(json).unwrap();
    assert_eq!(report.total_comments, 10);
    assert_eq!(store.count_runs(draft_id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_gateway_failure_is_500() {
    let (store, draft_id) = seeded_store("Bill", &sample_comments()).await;
    let gateway = Arc::new(RecordingGateway::new());
    gateway.push_error(ConsultError::gateway_error(502, "bad gateway", None));
    let uri = format!("/api/analyze/{}", draft_id);
    let (status, body) = send(app_for(store, gateway), "POST", &uri).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn test_draft_analysis_view() {
    let (store, draft_id) = seeded_store("Bill", &sample_comments()).await;
    let gateway = Arc::new(RecordingGateway::new());
    let app = app_for(store.clone(), gateway);

    let uri = format!("/api/drafts/{}/analysis", draft_id);
    let (status, body) = send(app.clone(), "GET", &uri).await;
    assert_eq!(status, StatusCode::OK);
    let before: DraftAnalysisView = serde_json::from_slice(&body).unwrap();
    assert!(before.last_run.is_none());
    assert_eq!(before.comments.len(), 10);
    assert_eq!(before.sentiment_counts[&Sentiment::Neutral], 10);

    send(app.clone(), "POST", &format!("/api/analyze/{}", draft_id)).await;

    let (status, body) = send(app, "GET", &uri).await;
    assert_eq!(status, StatusCode::OK);
    let raw: Value = serde_json::from_slice(&body).unwrap();
    assert!(raw["comments"][0].get("gemini_response").is_none());

    let after: DraftAnalysisView = serde_json::from_value(raw).unwrap();
    let run = after.last_run.unwrap();
    assert_eq!(run.total_comments, 10);
    assert_eq!(after.sentiment_counts[&Sentiment::Positive], 4);
    assert!(after.comments.iter().all(|c| c.is_analyzed()));
}

#[tokio::test]
async fn test_non_numeric_draft_id_is_json_400() {
    let (store, _) = seeded_store("Bill", &sample_comments()).await;
    let gateway = Arc::new(RecordingGateway::new());
    let app = app_for(store, gateway.clone());

    for (method, uri) in [("POST", "/api/analyze/abc"), ("GET", "/api/drafts/abc/analysis")] {
        let (status, body) = send(app.clone(), method, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("abc"));
    }
    assert!(gateway.prompts().is_empty());
}
