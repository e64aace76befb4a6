// Generation request builder

use crate::client::{GeminiClient, Generation};
use crate::offline;
use crate::types::*;
use crate::utils::{validate_range, StringValidator};

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

/// Fluent builder for a single `generateContent` call.
pub struct GenerationBuilder {
    client: Arc<GeminiClient>,
    prompt: Option<String>,
    temperature: f32,
    max_tokens: u32,
}

impl GenerationBuilder {
    pub(crate) fn from_client(client: Arc<GeminiClient>) -> Self {
        Self {
            client,
            prompt: None,
            temperature: 0.0,
            max_tokens: 500,
        }
    }

    /// Set the prompt text (must not be blank)
    pub fn prompt(mut self, prompt: impl Into<String>) -> ConsultResult<Self> {
        self.prompt = Some(StringValidator::not_empty(prompt, "prompt")?);
        Ok(self)
    }

    /// Set the temperature parameter (between 0.0 and 2.0)
    pub fn temperature(mut self, temperature: f32) -> ConsultResult<Self> {
        self.temperature = validate_range(temperature, 0.0, 2.0, "temperature")?;
        Ok(self)
    }

    /// Set the maximum number of output tokens
    pub fn max_tokens(mut self, max_tokens: u32) -> ConsultResult<Self> {
        if max_tokens == 0 {
            return Err(ConsultError::Validation("max_tokens must be greater than 0".into()));
        }
        self.max_tokens = max_tokens;
        Ok(self)
    }

    fn endpoint(&self) -> ConsultResult<Url> {
        let raw = format!("{}/models/{}:generateContent", self.client.base_url, self.client.model);
        Url::parse(&raw).map_err(|e| ConsultError::Config(format!("Invalid Gemini endpoint {}: {}", raw, e)))
    }

    /// Send the request and return the generated text with its envelope.
    ///
    /// Without an API key the offline heuristic answers instead.
    pub async fn send(self) -> ConsultResult<Generation> {
        let prompt = self
            .prompt
            .clone()
            .ok_or_else(|| ConsultError::Validation("A prompt is required".to_string()))?;

        let api_key = match &self.client.api_key {
            Some(key) => key,
            None => {
                tracing::debug!("No Gemini API key configured, answering offline");
                return Ok(offline::respond(&prompt));
            }
        };

        let body = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![TextPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_tokens,
            },
        };

        let endpoint = self.endpoint()?;
        tracing::debug!(model = %self.client.model, max_tokens = self.max_tokens, "Calling Gemini");

        let response = self
            .client
            .http_client
            .post(endpoint)
            .header("x-goog-api-key", api_key.as_str())
            .json(&body)
            .send()
            .await?;

        let response = handle_error_response(response).await?;

        let raw: Value = response.json().await.map_err(|e| {
            ConsultError::request_error(
                format!("Invalid Gemini response body: {}", e.without_url()),
                None::<reqwest::Error>,
                Some(concat!(file!(), ":", line!())),
            )
        })?;

        Ok(Generation {
            text: candidate_text(&raw),
            raw,
        })
    }
}

/// Map a non-2xx response to a gateway error carrying status and body
async fn handle_error_response(response: reqwest::Response) -> ConsultResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(gateway_error!(status, body))
}

/// Text of the first candidate's first part, empty when absent
pub fn candidate_text(raw: &Value) -> String {
    raw.pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
