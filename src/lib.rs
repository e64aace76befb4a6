//! # econsult: sentiment analysis for public-consultation comments
//!
//! Comments submitted on a policy draft are classified as Positive, Neutral
//! or Negative by a Gemini model, aggregated into a sentiment histogram,
//! keyword list and representative samples, summarized by a second model
//! call, and logged as an append-only analysis run.
//!
//! ## Pipeline
//!
//! - [`prompt`]: pure prompt builders
//! - [`client`]: the [`Gateway`] trait and the Gemini client (offline heuristic without a key)
//! - [`parser`]: tolerant reading of model replies
//! - [`aggregate`]: counts, keywords, samples
//! - [`store`]: SQLite persistence
//! - [`analyzer`]: the run itself
//! - [`api`]: axum routes for the dashboard
//!
//! ## Basic Usage
//!
//! ```no_run
//! use econsult::{Analyzer, GeminiClient, Store};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Store::connect("sqlite://econsult.db").await?;
//!     let gateway = GeminiClient::new(std::env::var("GEMINI_API_KEY").ok())?;
//!     let analyzer = Analyzer::new(store, Arc::new(gateway));
//!
//!     let report = analyzer.analyze_draft(1).await?;
//!     println!("{:?}", report.sentiment_counts);
//!     Ok(())
//! }
//! ```

#[macro_use]
pub mod types;

pub mod aggregate;
pub mod analyzer;
pub mod api;
mod builder;
pub mod client;
pub mod config;
pub mod domains;
pub mod models;
pub mod offline;
pub mod parser;
pub mod prompt;
pub mod store;
pub mod utils;

pub use analyzer::{AnalysisReport, Analyzer};
pub use builder::GenerationBuilder;
pub use client::{Gateway, GeminiClient, Generation, GenerationOptions, OfflineGateway};
pub use config::Config;
pub use domains::{ClassificationMode, CommentClassifier, DraftSummarizer};
pub use models::{AnalysisRun, Classification, Comment, Draft, Keyword, OverallSummary, Sentiment, SentimentCounts};
pub use store::Store;
pub use types::{ConsultError, ConsultResult, SecureApiKey};

/// Gemini client configured from `GEMINI_API_KEY`; offline when unset
pub fn from_env() -> ConsultResult<GeminiClient> {
    GeminiClient::new(std::env::var("GEMINI_API_KEY").ok())
}
