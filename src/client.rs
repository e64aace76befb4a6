// Gemini gateway client

use crate::builder::GenerationBuilder;
use crate::offline;
use crate::types::*;
use async_trait::async_trait;
use reqwest::{header, Client as HttpClient};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Sampling options sent with every generation request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: 500,
        }
    }
}

/// Text produced by the model plus the full provider envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub raw: Value,
}

/// Anything that can turn a prompt into model text.
///
/// The analysis pipeline only talks to this trait, so tests and offline runs
/// can swap the backend without touching the pipeline.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> ConsultResult<Generation>;
}

#[derive(Clone)]
pub struct GeminiClient {
    pub(crate) http_client: HttpClient,
    pub(crate) api_key: Option<SecureApiKey>,
    pub base_url: String,
    pub model: String,
}

impl GeminiClient {
    /// Create a client; without an API key every call is answered offline
    pub fn new(api_key: Option<String>) -> ConsultResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| request_error!("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            api_key: api_key
                .filter(|k| !k.trim().is_empty())
                .map(SecureApiKey::new),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Set a custom base URL for the API
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model used for every request
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Whether requests go to the remote API rather than the offline heuristic
    pub fn is_online(&self) -> bool {
        self.api_key.is_some()
    }

    /// Start building a generation request
    pub fn request(&self) -> GenerationBuilder {
        GenerationBuilder::from_client(Arc::new(self.clone()))
    }
}

#[async_trait]
impl Gateway for GeminiClient {
    async fn generate(&self, prompt: &str, options: GenerationOptions) -> ConsultResult<Generation> {
        self.request()
            .prompt(prompt)?
            .temperature(options.temperature)?
            .max_tokens(options.max_tokens)?
            .send()
            .await
    }
}

/// Gateway that always answers with the offline heuristic
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGateway;

#[async_trait]
impl Gateway for OfflineGateway {
    async fn generate(&self, prompt: &str, _options: GenerationOptions) -> ConsultResult<Generation> {
        Ok(offline::respond(prompt))
    }
}
