// Comment classification client

use crate::client::{Gateway, Generation, GenerationOptions};
use crate::domains::{base::BaseDomainClient, DomainClient, DomainOperations, ValidationOperations};
use crate::models::{Classification, Comment};
use crate::parser::{parse_batch_classification, parse_single_classification};
use crate::prompt::{build_batch_prompt, build_single_prompt};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How comments are sent to the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationMode {
    /// One prompt per batch of unanalyzed comments
    #[default]
    Batch,
    /// One prompt per unanalyzed comment
    Single,
}

const BATCH_OPTIONS: GenerationOptions = GenerationOptions {
    temperature: 0.0,
    max_tokens: 600,
};

const SINGLE_OPTIONS: GenerationOptions = GenerationOptions {
    temperature: 0.0,
    max_tokens: 200,
};

/// Verdicts read from one model reply, with the reply itself
#[derive(Debug, Clone)]
pub struct ClassifiedBatch {
    pub classifications: Vec<Classification>,
    pub response: Generation,
}

pub struct CommentClassifier {
    base: BaseDomainClient,
}

impl CommentClassifier {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            base: BaseDomainClient::new(gateway, "comment_classification"),
        }
    }

    /// Classify several comments with one prompt
    pub async fn classify_batch(&self, comments: &[&Comment], draft_title: &str) -> ConsultResult<ClassifiedBatch> {
        let comments = self.validate_not_empty(comments, "comments")?;
        let prompt = build_batch_prompt(comments, draft_title);
        let response = self.execute_prompt(&prompt, BATCH_OPTIONS).await?;

        let ids: Vec<i64> = comments.iter().map(|c| c.id).collect();
        let classifications = parse_batch_classification(&response.text, &ids);

        Ok(ClassifiedBatch {
            classifications,
            response,
        })
    }

    /// Classify one comment with its own prompt
    pub async fn classify_one(&self, comment: &Comment, draft_title: &str) -> ConsultResult<ClassifiedBatch> {
        let prompt = build_single_prompt(comment, draft_title);
        let response = self.execute_prompt(&prompt, SINGLE_OPTIONS).await?;
        let classification = parse_single_classification(&response.text, comment.id);

        Ok(ClassifiedBatch {
            classifications: vec![classification],
            response,
        })
    }
}

impl DomainClient for CommentClassifier {
    fn domain_name(&self) -> &str {
        self.base.domain_name()
    }
}

impl ValidationOperations for CommentClassifier {}

impl DomainOperations for CommentClassifier {
    fn gateway(&self) -> &dyn Gateway {
        self.base.gateway()
    }
}
