//! Prompt → gateway → parser pipelines.
//!
//! Each domain client owns one kind of model exchange:
//!
//! - [`CommentClassifier`]: per-comment sentiment, batched or one at a time
//! - [`DraftSummarizer`]: the draft-level summary built from aggregates
//!
//! Both compose a [`base::BaseDomainClient`] and get the shared plumbing from
//! the [`DomainOperations`] and [`ValidationOperations`] traits.

pub mod base;
pub mod classification;
pub mod summary;

pub use classification::{ClassificationMode, ClassifiedBatch, CommentClassifier};
pub use summary::DraftSummarizer;

use crate::client::{Gateway, Generation, GenerationOptions};
use crate::types::*;
use std::future::Future;
use std::pin::Pin;

/// Future returned by gateway-backed domain operations
pub type GenerationFuture<'a> = Pin<Box<dyn Future<Output = ConsultResult<Generation>> + Send + 'a>>;

/// Common trait for all domain clients
pub trait DomainClient: Send + Sync {
    /// The domain name for this client, used in logs and errors
    fn domain_name(&self) -> &str;
}

/// Input checks shared by the domain clients
pub trait ValidationOperations: DomainClient {
    fn validation_error<T>(&self, message: impl Into<String>) -> ConsultResult<T> {
        Err(ConsultError::Validation(format!(
            "{}: {}",
            self.domain_name(),
            message.into()
        )))
    }

    /// Validate a collection is not empty
    fn validate_not_empty<C: AsRef<[T]>, T>(&self, collection: C, param_name: &str) -> ConsultResult<C> {
        if collection.as_ref().is_empty() {
            return self.validation_error(format!("{} cannot be empty", param_name));
        }
        Ok(collection)
    }
}

/// Gateway access shared by the domain clients
pub trait DomainOperations: DomainClient {
    fn gateway(&self) -> &dyn Gateway;

    /// Send a prompt and return the raw generation
    fn execute_prompt<'a>(&'a self, prompt: &'a str, options: GenerationOptions) -> GenerationFuture<'a> {
        Box::pin(async move {
            tracing::debug!(
                domain = self.domain_name(),
                prompt_chars = prompt.chars().count(),
                "Sending prompt"
            );
            self.gateway().generate(prompt, options).await
        })
    }
}
