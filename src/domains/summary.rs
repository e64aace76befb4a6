// Draft summary client

use crate::client::{Gateway, Generation, GenerationOptions};
use crate::domains::{base::BaseDomainClient, DomainClient, DomainOperations};
use crate::models::OverallSummary;
use crate::parser::parse_overall_summary;
use crate::prompt::{build_overall_prompt, OverallPromptInput};
use crate::types::*;
use std::sync::Arc;

const SUMMARY_OPTIONS: GenerationOptions = GenerationOptions {
    temperature: 0.0,
    max_tokens: 600,
};

pub struct DraftSummarizer {
    base: BaseDomainClient,
}

impl DraftSummarizer {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            base: BaseDomainClient::new(gateway, "draft_summary"),
        }
    }

    /// Ask the model for a summary of the aggregate statistics.
    ///
    /// Gateway failures are returned; unreadable replies are not (they become
    /// the parse-error placeholder summary).
    pub async fn summarize(&self, input: &OverallPromptInput<'_>) -> ConsultResult<(OverallSummary, Generation)> {
        let prompt = build_overall_prompt(input);
        let response = self.execute_prompt(&prompt, SUMMARY_OPTIONS).await?;
        Ok((parse_overall_summary(&response.text), response))
    }
}

impl DomainClient for DraftSummarizer {
    fn domain_name(&self) -> &str {
        self.base.domain_name()
    }
}

impl DomainOperations for DraftSummarizer {
    fn gateway(&self) -> &dyn Gateway {
        self.base.gateway()
    }
}
