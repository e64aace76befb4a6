use async_trait::async_trait;
use econsult::models::NewComment;
use econsult::offline;
use econsult::types::{ConsultError, ConsultResult};
use econsult::{Gateway, Generation, GenerationOptions, Store};
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Gateway that records every prompt and answers from a script, falling back
/// to the offline heuristic when the script is empty
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingGateway {
    prompts: Mutex<Vec<String>>,
    scripted: Mutex<VecDeque<ConsultResult<String>>>,
    fail_summaries: bool,
}

#[allow(dead_code)]
impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every overall-summary prompt fails with a 503
    pub fn failing_summaries() -> Self {
        Self {
            fail_summaries: true,
            ..Self::default()
        }
    }

    /// Queue a reply text for the next call
    pub fn push_reply(&self, text: impl Into<String>) {
        self.scripted.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue an error for the next call
    pub fn push_error(&self, error: ConsultError) {
        self.scripted.lock().unwrap().push_back(Err(error));
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Prompts other than the overall summary
    pub fn classification_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| !offline::is_summary_prompt(p))
            .collect()
    }

    pub fn summary_prompts(&self) -> Vec<String> {
        self.prompts()
            .into_iter()
            .filter(|p| offline::is_summary_prompt(p))
            .collect()
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn generate(&self, prompt: &str, _options: GenerationOptions) -> ConsultResult<Generation> {
        self.prompts.lock().unwrap().push(prompt.to_string());

        if self.fail_summaries && offline::is_summary_prompt(prompt) {
            return Err(ConsultError::gateway_error(503, "model overloaded", None));
        }

        let next = self.scripted.lock().unwrap().pop_front();
        match next {
            Some(Ok(text)) => Ok(Generation {
                raw: json!({ "candidates": [{ "content": { "parts": [{ "text": text.clone() }] } }] }),
                text,
            }),
            Some(Err(e)) => Err(e),
            None => Ok(offline::respond(prompt)),
        }
    }
}

/// Fresh in-memory store with one draft holding `comments` (text, stakeholder type)
#[allow(dead_code)]
pub async fn seeded_store(title: &str, comments: &[(&str, Option<&str>)]) -> (Store, i64) {
    let store = Store::in_memory().await.expect("in-memory store");
    let draft_id = store.create_draft(title).await.expect("create draft");
    for (text, stakeholder) in comments {
        store
            .create_comment(&NewComment {
                draft_id,
                section_id: None,
                comment_text: text.to_string(),
                stakeholder_type: stakeholder.map(str::to_string),
            })
            .await
            .expect("create comment");
    }
    (store, draft_id)
}

/// Ten comments with a mix of offline verdicts
#[allow(dead_code)]
pub fn sample_comments() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("I support the new licensing rules for startups", Some("citizen")),
        ("There is a serious concern about compliance costs", Some("citizen")),
        ("The timeline in clause 4 is unclear", Some("government")),
        ("Small firms will benefit from the simplified filing", Some("citizen")),
        ("We oppose the retroactive penalties", Some("industry")),
        ("Please define the term digital intermediary", None),
        ("Strong support from our association", Some("industry")),
        ("Data retention creates a privacy risk", Some("citizen")),
        ("The annex duplicates existing reporting", Some("government")),
        ("Good step, we welcome consultation", Some("citizen")),
    ]
}
