use chrono::{Duration, Utc};
use econsult::models::{Classification, NewAnalysisRun, NewComment, OverallSummary, SentimentCounts};
use econsult::store::{ImportComment, ImportDocument, ImportDraft, ImportSection, ImportSummary};
use econsult::{ConsultError, Sentiment, Store};
use pretty_assertions::assert_eq;
use serde_json::json;

fn run_for(draft_id: i64, summary: &str) -> NewAnalysisRun {
    let mut counts = SentimentCounts::new();
    counts.insert(Sentiment::Neutral, 1);
    NewAnalysisRun {
        draft_id,
        total_comments: 1,
        sentiment_counts: counts,
        top_keywords: vec![],
        summary: OverallSummary {
            draft_summary: summary.to_string(),
            stakeholder_suggestions: json!({}),
            ..Default::default()
        },
        gemini_response: json!({ "mock": true }),
    }
}

#[tokio::test]
async fn test_import_links_sections() {
    let store = Store::in_memory().await.unwrap();
    let document: ImportDocument = serde_json::from_value(json!({
        "drafts": [{
            "title": "Companies (Amendment) Bill",
            "sections": [{ "code": "S1", "title": "Definitions" }],
            "comments": [
                { "text": "Define small company clearly", "stakeholder_type": "citizen", "section": "S1" },
                { "text": "General support" }
            ]
        }]
    }))
    .unwrap();

    let summary = store.import(&document).await.unwrap();
    assert_eq!(summary, ImportSummary { drafts: 1, sections: 1, comments: 2 });

    let drafts = store.list_drafts().await.unwrap();
    assert_eq!(drafts.len(), 1);
    let comments = store.comments_for_draft(drafts[0].id, None).await.unwrap();
    assert_eq!(comments[0].section_code.as_deref(), Some("S1"));
    assert_eq!(comments[0].section_title.as_deref(), Some("Definitions"));
    assert_eq!(comments[0].stakeholder_type.as_deref(), Some("citizen"));
    assert_eq!(comments[1].section_id, None);
    assert!(comments.iter().all(|c| !c.is_analyzed()));
}

#[tokio::test]
async fn test_import_unknown_section_rolls_back() {
    let store = Store::in_memory().await.unwrap();
    let document = ImportDocument {
        drafts: vec![ImportDraft {
            title: "Bill".to_string(),
            sections: vec![ImportSection { code: "A".to_string(), title: None }],
            comments: vec![ImportComment {
                text: "text".to_string(),
                stakeholder_type: None,
                section: Some("B".to_string()),
            }],
        }],
    };

    let err = store.import(&document).await.unwrap_err();
    assert!(matches!(err, ConsultError::Validation(_)));
    assert!(store.list_drafts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_record_classification_is_scoped_to_draft() {
    let store = Store::in_memory().await.unwrap();
    let draft = store.create_draft("A").await.unwrap();
    let other = store.create_draft("B").await.unwrap();
    let comment_id = store
        .create_comment(&NewComment {
            draft_id: draft,
            comment_text: "hello".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    let verdict = Classification { id: comment_id, sentiment: Sentiment::Positive, confidence: 0.66 };
    let raw = json!({ "text": "[]" });

    assert!(!store.record_classification(other, &verdict, &raw, Utc::now()).await.unwrap());
    assert!(store.record_classification(draft, &verdict, &raw, Utc::now()).await.unwrap());

    let comment = &store.comments_for_draft(draft, None).await.unwrap()[0];
    assert_eq!(comment.sentiment, Some(Sentiment::Positive));
    assert_eq!(comment.confidence, Some(0.66));
    assert_eq!(comment.gemini_response, Some(raw));
    assert!(comment.analyzed_at.is_some());
}

#[tokio::test]
async fn test_comment_limit() {
    let store = Store::in_memory().await.unwrap();
    let draft = store.create_draft("A").await.unwrap();
    for i in 0..5 {
        store
            .create_comment(&NewComment {
                draft_id: draft,
                comment_text: format!("comment {}", i),
                ..Default::default()
            })
            .await
            .unwrap();
    }

    assert_eq!(store.comments_for_draft(draft, Some(3)).await.unwrap().len(), 3);
    assert_eq!(store.comments_for_draft(draft, None).await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_latest_run_orders_by_time() {
    let store = Store::in_memory().await.unwrap();
    let draft = store.create_draft("A").await.unwrap();
    assert!(store.latest_run(draft).await.unwrap().is_none());

    let now = Utc::now();
    store.insert_run(&run_for(draft, "newer"), now).await.unwrap();
    store
        .insert_run(&run_for(draft, "older"), now - Duration::hours(1))
        .await
        .unwrap();

    let latest = store.latest_run(draft).await.unwrap().unwrap();
    assert_eq!(latest.draft_summary, "newer");
    assert_eq!(latest.sentiment_counts[&Sentiment::Neutral], 1);
    assert_eq!(latest.gemini_response, json!({ "mock": true }));
    assert_eq!(store.count_runs(draft).await.unwrap(), 2);
}
